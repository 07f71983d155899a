use super::error::MetainfoError;
use super::info_hash::InfoHash;
use super::magnet::MagnetLink;
use super::torrent::Metainfo;

/// Torrent metadata from either source, viewed through the shape both share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    Torrent(Metainfo),
    Magnet(MagnetLink),
}

impl Metadata {
    /// Parses `input` as a magnet URI when it starts with `magnet:?`
    /// (leading whitespace ignored), otherwise as `.torrent` bytes.
    pub fn parse(input: &[u8]) -> Result<Self, MetainfoError> {
        let trimmed = input.trim_ascii_start();
        if trimmed.starts_with(b"magnet:?") {
            let uri = std::str::from_utf8(trimmed)
                .map_err(|_| MetainfoError::InvalidMagnetLink("not valid utf-8".into()))?;
            return MagnetLink::parse(uri.trim_end()).map(Metadata::Magnet);
        }
        Metainfo::from_bytes(input).map(Metadata::Torrent)
    }

    pub fn info_hash(&self) -> InfoHash {
        match self {
            Metadata::Torrent(t) => t.info_hash,
            Metadata::Magnet(m) => m.info_hash,
        }
    }

    pub fn tracker_tiers(&self) -> &[Vec<String>] {
        match self {
            Metadata::Torrent(t) => &t.tracker_tiers,
            Metadata::Magnet(m) => &m.tracker_tiers,
        }
    }

    /// Display name; magnet links may not carry one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Metadata::Torrent(t) => Some(&t.name),
            Metadata::Magnet(m) => m.display_name.as_deref(),
        }
    }

    /// Every tracker URL once, in first-seen tier order.
    ///
    /// This is the list to probe: results are joined back to tiers by exact
    /// URL, so a tracker repeated across tiers only needs one probe.
    pub fn trackers(&self) -> Vec<String> {
        let mut trackers: Vec<String> = Vec::new();
        for tracker in self.tracker_tiers().iter().flatten() {
            if !trackers.contains(tracker) {
                trackers.push(tracker.clone());
            }
        }
        trackers
    }
}

impl From<Metainfo> for Metadata {
    fn from(torrent: Metainfo) -> Self {
        Metadata::Torrent(torrent)
    }
}

impl From<MagnetLink> for Metadata {
    fn from(magnet: MagnetLink) -> Self {
        Metadata::Magnet(magnet)
    }
}
