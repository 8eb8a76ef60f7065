/// Listening events and the grouping keys queries rank them by.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Artwork sizes in order of preference.
const ARTWORK_SIZES: [&str; 3] = ["extralarge", "large", "medium"];

/// One play of a track, as produced by the loader.
///
/// String fields may be empty; `timestamp_utc` may be empty or unparsable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Event {
    pub artist: String,
    pub album: String,
    pub track: String,
    /// UTC time as `"DD Mon YYYY, HH:MM"`.
    pub timestamp_utc: String,
    /// Unix timestamp in seconds, kept as text. Only used for coarse filtering.
    pub raw_epoch: String,
    /// Artwork URLs keyed by size label (`small`, `medium`, `large`, `extralarge`).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub media_urls: IndexMap<String, String>,
    #[serde(default)]
    pub permalink: String,
}

impl Event {
    pub fn new(artist: &str, album: &str, track: &str, timestamp_utc: &str) -> Self {
        Self {
            artist: artist.to_string(),
            album: album.to_string(),
            track: track.to_string(),
            timestamp_utc: timestamp_utc.to_string(),
            ..Default::default()
        }
    }

    /// Best available artwork URL: extralarge, then large, then medium.
    pub fn artwork(&self) -> Option<&str> {
        ARTWORK_SIZES
            .iter()
            .filter_map(|size| self.media_urls.get(*size))
            .map(String::as_str)
            .find(|url| !url.is_empty())
    }

    pub fn permalink(&self) -> Option<&str> {
        Some(self.permalink.as_str()).filter(|url| !url.is_empty())
    }

    /// Track key, present when the track name is non-empty.
    pub fn track_key(&self) -> Option<TrackKey> {
        if self.track.is_empty() {
            return None;
        }
        Some(TrackKey::new(&self.artist, &self.track))
    }

    /// Track key requiring both artist and track names, as streaks do.
    pub fn attributed_track_key(&self) -> Option<TrackKey> {
        if self.artist.is_empty() {
            return None;
        }
        self.track_key()
    }

    /// Album key, present when the album name is non-empty.
    pub fn album_key(&self) -> Option<AlbumKey> {
        if self.album.is_empty() {
            return None;
        }
        Some(AlbumKey::new(&self.artist, &self.album))
    }

    /// Album key requiring both artist and album names, as streaks do.
    pub fn attributed_album_key(&self) -> Option<AlbumKey> {
        if self.artist.is_empty() {
            return None;
        }
        self.album_key()
    }

    pub fn artist_key(&self) -> Option<String> {
        Some(self.artist.clone()).filter(|artist| !artist.is_empty())
    }

    pub fn is_track(&self, artist: &str, track: &str) -> bool {
        self.artist == artist && self.track == track
    }
}

/// (artist, track) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct TrackKey {
    pub artist: String,
    pub track: String,
}

impl TrackKey {
    pub fn new(artist: &str, track: &str) -> Self {
        Self {
            artist: artist.to_string(),
            track: track.to_string(),
        }
    }
}

/// (artist, album) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct AlbumKey {
    pub artist: String,
    pub album: String,
}

impl AlbumKey {
    pub fn new(artist: &str, album: &str) -> Self {
        Self {
            artist: artist.to_string(),
            album: album.to_string(),
        }
    }
}
