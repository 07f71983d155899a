//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the self-describing serialization used by `.torrent` files.
//! The info hash of a torrent is computed over the *canonical* encoding of
//! its `info` dictionary, so the encoder here always emits dictionary keys
//! in ascending byte order, whatever order they were decoded in.
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Examples
//!
//! ```
//! use torrent_probe::bencode::{decode, encode, Value};
//!
//! let value = decode(b"d3:bar4:spam3:fooi42ee").unwrap();
//! assert_eq!(value.get(b"bar").and_then(|v| v.as_str()), Some("spam"));
//! assert_eq!(value.get(b"foo").and_then(|v| v.as_integer()), Some(42));
//!
//! // Keys were already sorted, so re-encoding is byte-identical.
//! assert_eq!(encode(&value), b"d3:bar4:spam3:fooi42ee");
//! ```
//!
//! Unsorted input decodes fine but re-encodes canonically:
//!
//! ```
//! use torrent_probe::bencode::{decode, encode};
//!
//! let value = decode(b"d3:fooi1e3:bari2ee").unwrap();
//! assert_eq!(encode(&value), b"d3:bari2e3:fooi1ee");
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::decode;
pub use encode::encode;
pub use error::BencodeError;
pub use value::Value;
