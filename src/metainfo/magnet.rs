use super::error::MetainfoError;
use super::info_hash::InfoHash;
use std::borrow::Cow;

const MAGNET_PREFIX: &str = "magnet:?";
const BTIH_PREFIX: &str = "urn:btih:";

/// A parsed magnet URI.
///
/// Magnet links carry no tier grouping, so every `tr` parameter becomes its
/// own single-tracker tier, in the order it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetLink {
    pub info_hash: InfoHash,
    pub display_name: Option<String>,
    pub tracker_tiers: Vec<Vec<String>>,
    pub web_seeds: Vec<String>,
}

impl MagnetLink {
    /// Parses a `magnet:?` URI with a BitTorrent v1 (`urn:btih:`) topic.
    ///
    /// The hash may be given as 40 hex digits or 32 base32 symbols; either
    /// way the other form is derived from the decoded bytes.
    ///
    /// ```
    /// use torrent_probe::metainfo::MagnetLink;
    ///
    /// let magnet = MagnetLink::parse(
    ///     "magnet:?xt=urn:btih:c12fe1c06bba254a9dc9f519b335aa7c1367a88a\
    ///      &tr=http%3A%2F%2Ftracker.example.com%2Fannounce&dn=Example+File",
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(magnet.display_name.as_deref(), Some("Example File"));
    /// assert_eq!(
    ///     magnet.tracker_tiers,
    ///     vec![vec!["http://tracker.example.com/announce".to_string()]]
    /// );
    /// assert_eq!(magnet.info_hash.to_base32(), "YEX6DQDLXISUVHOJ6UM3GNNKPQJWPKEK");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails when the prefix or `xt` parameter is missing, the topic is not
    /// `urn:btih:`, or the hash token is malformed or the wrong length.
    pub fn parse(uri: &str) -> Result<Self, MetainfoError> {
        let query = uri
            .strip_prefix(MAGNET_PREFIX)
            .ok_or_else(|| MetainfoError::InvalidMagnetLink("missing magnet:? prefix".into()))?;
        let params = QueryParams::parse(query);

        let xt = params
            .first("xt")
            .ok_or_else(|| MetainfoError::InvalidMagnetLink("missing xt parameter".into()))?;
        let token = xt.strip_prefix(BTIH_PREFIX).ok_or_else(|| {
            MetainfoError::InvalidMagnetLink(format!("unsupported xt format: {}", xt))
        })?;

        let info_hash = match token.len() {
            40 => InfoHash::from_hex(token)?,
            32 => InfoHash::from_base32(token)?,
            _ => {
                return Err(MetainfoError::InvalidMagnetLink(
                    "invalid info hash length".into(),
                ))
            }
        };

        let display_name = params
            .first("dn")
            .filter(|name| !name.is_empty())
            .map(String::from);

        let tracker_tiers = params.all("tr").map(|tr| vec![tr.to_string()]).collect();
        let web_seeds = params.all("ws").map(String::from).collect();

        Ok(Self {
            info_hash,
            display_name,
            tracker_tiers,
            web_seeds,
        })
    }

    /// Tracker URLs in tier order.
    pub fn trackers(&self) -> impl Iterator<Item = &str> {
        self.tracker_tiers.iter().flatten().map(String::as_str)
    }

    pub fn to_uri(&self) -> String {
        let mut uri = format!("{}xt={}{}", MAGNET_PREFIX, BTIH_PREFIX, self.info_hash.to_hex());

        if let Some(ref name) = self.display_name {
            uri.push_str("&dn=");
            uri.push_str(&urlencoding::encode(name));
        }
        for tracker in self.trackers() {
            uri.push_str("&tr=");
            uri.push_str(&urlencoding::encode(tracker));
        }
        for ws in &self.web_seeds {
            uri.push_str("&ws=");
            uri.push_str(&urlencoding::encode(ws));
        }

        uri
    }
}

/// `application/x-www-form-urlencoded` pairs in their original order.
struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn parse(query: &str) -> Self {
        let pairs = query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (form_decode(key), form_decode(value))
            })
            .collect();
        Self(pairs)
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn form_decode(s: &str) -> String {
    let spaced: Cow<'_, str> = if s.contains('+') {
        Cow::Owned(s.replace('+', " "))
    } else {
        Cow::Borrowed(s)
    };
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}
