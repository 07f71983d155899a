//! RFC 4648 base32, used for the alternate text form of info hashes.
//!
//! A 20-byte info hash is 160 bits, an exact multiple of 5, so it always
//! encodes to 32 symbols with no padding.

use super::error::MetainfoError;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Encodes `bytes` as uppercase base32, padded with `=` to a multiple of 8.
///
/// ```
/// use torrent_probe::metainfo::base32;
///
/// assert_eq!(base32::encode(b"f"), "MY======");
/// assert_eq!(base32::encode(b"foobar"), "MZXW6YTBOI======");
/// assert_eq!(base32::encode(&[0u8; 20]).len(), 32);
/// ```
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(5) * 8);
    let mut buffer: u16 = 0;
    let mut bits = 0u32;

    for &byte in bytes {
        buffer = (buffer << 8) | u16::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[usize::from((buffer >> bits) & 0x1f)] as char);
        }
        buffer &= (1 << bits) - 1;
    }

    if bits > 0 {
        out.push(ALPHABET[usize::from((buffer << (5 - bits)) & 0x1f)] as char);
    }

    while out.len() % 8 != 0 {
        out.push('=');
    }

    out
}

/// Decodes base32 text, ignoring letter case and every `=`, wherever it
/// appears.
///
/// Leftover bits that do not make up a whole byte are dropped.
///
/// # Errors
///
/// Returns [`MetainfoError::InvalidBase32`] for any symbol outside the
/// alphabet.
pub fn decode(input: &str) -> Result<Vec<u8>, MetainfoError> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u16 = 0;
    let mut bits = 0u32;

    for c in input.chars().filter(|&c| c != '=') {
        let upper = c.to_ascii_uppercase();
        let value = ALPHABET
            .iter()
            .position(|&s| s as char == upper)
            .ok_or(MetainfoError::InvalidBase32(c))? as u16;

        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    Ok(out)
}
