//! Torrent metadata normalization ([BEP-3], [BEP-9], [BEP-12]).
//!
//! Two sources describe the same content and normalize to the same shape:
//!
//! - [`Metainfo`] parses a `.torrent` file. Its [`InfoHash`] is the SHA-1 of
//!   the *canonical* bencoding of the `info` dictionary, so a file whose keys
//!   were written out of order still gets the hash other clients compute.
//! - [`MagnetLink`] parses a `magnet:?` URI, accepting the hash as 40 hex
//!   digits or 32 base32 symbols.
//!
//! [`Metadata`] wraps either one for code that does not care where the
//! metadata came from.
//!
//! # Examples
//!
//! ```
//! use torrent_probe::metainfo::{Metadata, MagnetLink};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let magnet = MagnetLink::parse(
//!     "magnet:?xt=urn:btih:YEX6DQDLXISUVHOJ6UM3GNNKPQJWPKEK&tr=udp://t.example:80",
//! )?;
//! assert_eq!(magnet.info_hash.to_hex(), "c12fe1c06bba254a9dc9f519b335aa7c1367a88a");
//!
//! let metadata = Metadata::from(magnet);
//! assert_eq!(metadata.trackers(), vec!["udp://t.example:80".to_string()]);
//! # Ok(())
//! # }
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html
//! [BEP-9]: http://bittorrent.org/beps/bep_0009.html
//! [BEP-12]: http://bittorrent.org/beps/bep_0012.html

pub mod base32;
mod error;
mod info_hash;
mod magnet;
mod source;
mod torrent;

pub use error::MetainfoError;
pub use info_hash::InfoHash;
pub use magnet::MagnetLink;
pub use source::Metadata;
pub use torrent::{File, Metainfo};
