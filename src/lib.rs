//! torrent-probe - torrent metadata normalization and tracker reachability
//!
//! Turns a `.torrent` file or a magnet link into one normalized view (info
//! hash, name, tracker tiers) and checks which of its trackers answer.
//!
//! # Modules
//!
//! - [`bencode`] - Bencode encoding/decoding with canonical dictionary order
//! - [`metainfo`] - Torrent files, magnet links, info hashes, Base32
//! - [`tracker`] - Tracker probing, relay fallback, bounded batches
//! - [`constants`] - Default timeouts, limits, relays and status policies
//!
//! ```
//! use torrent_probe::Metadata;
//!
//! let magnet = b"magnet:?xt=urn:btih:c12fe1c06bba254a9dc9f519b335aa7c1367a88a\
//!     &dn=Example&tr=udp%3A%2F%2Ftracker.example%3A80";
//! let metadata = Metadata::parse(magnet).unwrap();
//!
//! assert_eq!(metadata.name(), Some("Example"));
//! assert_eq!(metadata.trackers(), vec!["udp://tracker.example:80"]);
//! ```

pub mod bencode;
pub mod constants;
pub mod metainfo;
pub mod tracker;

pub use bencode::{decode, encode, BencodeError, Value};
pub use metainfo::{File, InfoHash, MagnetLink, Metadata, Metainfo, MetainfoError};
pub use tracker::{
    check_trackers, HttpTransport, ProbeConfig, ProbeError, ProbeResult, ProbeTransport,
    ReachabilityPolicy, Route, TrackerProbe,
};
