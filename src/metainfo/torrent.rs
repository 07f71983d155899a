use super::error::MetainfoError;
use super::info_hash::InfoHash;
use super::magnet::MagnetLink;
use crate::bencode::{decode, encode, Value};
use bytes::Bytes;
use std::collections::BTreeMap;

/// A normalized `.torrent` file.
///
/// # Examples
///
/// ```
/// use torrent_probe::metainfo::Metainfo;
///
/// let data = b"d8:announce18:http://t.example/a4:infod6:lengthi5e4:name5:a.txt\
///              12:piece lengthi16384e6:pieces0:ee";
/// let torrent = Metainfo::from_bytes(data).unwrap();
///
/// assert_eq!(torrent.tracker_tiers, vec![vec!["http://t.example/a".to_string()]]);
/// assert_eq!(torrent.files[0].path, "a.txt");
/// assert_eq!(torrent.info_hash.to_hex().len(), 40);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metainfo {
    /// SHA-1 of the canonically re-encoded `info` dictionary.
    pub info_hash: InfoHash,
    /// Tracker tiers in declaration order ([BEP-12](http://bittorrent.org/beps/bep_0012.html)).
    pub tracker_tiers: Vec<Vec<String>>,
    /// Set when `info.private` is exactly 1.
    pub private: bool,
    /// Never empty; single-file torrents get one entry named after the torrent.
    pub files: Vec<File>,
    pub name: String,
    pub total_length: u64,
    pub piece_length: Option<u64>,
    pub creation_date: Option<i64>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
}

/// A file within a torrent. Multi-file paths are `/`-joined and relative to
/// the torrent's root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: String,
    pub length: u64,
}

impl Metainfo {
    /// Parses and normalizes raw `.torrent` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid bencode, has no `info`
    /// dictionary, or lacks the name/length/file fields.
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let value = decode(data)?;
        let dict = value.as_dict().ok_or(MetainfoError::InvalidField("root"))?;

        let info_value = dict
            .get(b"info".as_slice())
            .ok_or(MetainfoError::MissingField("info"))?;
        let info = info_value
            .as_dict()
            .ok_or(MetainfoError::InvalidField("info"))?;

        let info_hash = InfoHash::from_info_bytes(&encode(info_value));

        let name = info
            .get(b"name".as_slice())
            .and_then(Value::to_string_lossy)
            .ok_or(MetainfoError::MissingField("name"))?;

        let files = parse_files(info, &name)?;
        let total_length = files
            .iter()
            .try_fold(0u64, |total, f| total.checked_add(f.length))
            .ok_or(MetainfoError::InvalidField("length"))?;

        let private = info
            .get(b"private".as_slice())
            .and_then(Value::as_integer)
            == Some(1);

        let piece_length = info
            .get(b"piece length".as_slice())
            .and_then(Value::as_integer)
            .and_then(|v| u64::try_from(v).ok());

        Ok(Self {
            info_hash,
            tracker_tiers: parse_tiers(dict),
            private,
            files,
            name,
            total_length,
            piece_length,
            creation_date: dict
                .get(b"creation date".as_slice())
                .and_then(Value::as_integer),
            comment: text_field(dict, b"comment"),
            created_by: text_field(dict, b"created by"),
        })
    }

    /// Tracker URLs in tier order, without de-duplication.
    pub fn trackers(&self) -> impl Iterator<Item = &str> {
        self.tracker_tiers.iter().flatten().map(String::as_str)
    }

    /// Builds the magnet link that points at this torrent.
    ///
    /// Tiers are flattened: each tracker becomes its own `tr` entry.
    pub fn magnet_link(&self) -> MagnetLink {
        MagnetLink {
            info_hash: self.info_hash,
            display_name: Some(self.name.clone()),
            tracker_tiers: self.trackers().map(|t| vec![t.to_string()]).collect(),
            web_seeds: Vec::new(),
        }
    }
}

fn parse_tiers(dict: &BTreeMap<Bytes, Value>) -> Vec<Vec<String>> {
    if let Some(tiers) = dict
        .get(b"announce-list".as_slice())
        .and_then(Value::as_list)
    {
        return tiers
            .iter()
            .filter_map(Value::as_list)
            .map(|urls| {
                urls.iter()
                    .filter_map(|u| u.as_str().map(String::from))
                    .collect()
            })
            .collect();
    }

    text_field(dict, b"announce")
        .map(|announce| vec![vec![announce]])
        .unwrap_or_default()
}

fn parse_files(info: &BTreeMap<Bytes, Value>, name: &str) -> Result<Vec<File>, MetainfoError> {
    let Some(files) = info.get(b"files".as_slice()) else {
        let length = info
            .get(b"length".as_slice())
            .ok_or(MetainfoError::MissingField("length"))
            .and_then(parse_length)?;
        return Ok(vec![File {
            path: name.to_string(),
            length,
        }]);
    };

    let entries = files
        .as_list()
        .filter(|list| !list.is_empty())
        .ok_or(MetainfoError::InvalidField("files"))?;

    entries
        .iter()
        .map(|entry| {
            let length = entry
                .get(b"length")
                .ok_or(MetainfoError::MissingField("file length"))
                .and_then(parse_length)?;

            let path = match entry.get(b"path") {
                Some(Value::List(segments)) => segments
                    .iter()
                    .filter_map(Value::to_string_lossy)
                    .collect::<Vec<_>>()
                    .join("/"),
                Some(Value::Bytes(path)) => String::from_utf8_lossy(path).into_owned(),
                _ => return Err(MetainfoError::MissingField("file path")),
            };

            Ok(File { path, length })
        })
        .collect()
}

fn parse_length(value: &Value) -> Result<u64, MetainfoError> {
    value
        .as_integer()
        .and_then(|v| u64::try_from(v).ok())
        .ok_or(MetainfoError::InvalidField("length"))
}

fn text_field(dict: &BTreeMap<Bytes, Value>, key: &[u8]) -> Option<String> {
    dict.get(key).and_then(|v| v.as_str()).map(String::from)
}
