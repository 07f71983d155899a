use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur when parsing torrent files or magnet links.
///
/// Parsing is all-or-nothing: any of these aborts the parse and no partial
/// metadata is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetainfoError {
    /// The torrent file contains invalid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing from the torrent file.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has an invalid value or type.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// The info hash does not decode to exactly 20 bytes.
    #[error("invalid info hash length")]
    InvalidInfoHashLength,

    /// A base32 string contains a symbol outside `A-Z2-7`.
    #[error("invalid base32 character: {0:?}")]
    InvalidBase32(char),

    /// The magnet link is malformed.
    #[error("invalid magnet link: {0}")]
    InvalidMagnetLink(String),
}
