use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::days::{DayBucket, DayTopTrack, PeakDay, PeakPlays};
use crate::event::{AlbumKey, TrackKey};
use crate::hourly::HourlyProfile;
use crate::ranker::RankedEntry;
use crate::streaks::Streak;

pub const SCHEMA_VERSION: i32 = 1;

/// Everything a renderer needs, computed once from the event list.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    pub schema_version: i32,
    pub generated_at: String,
    /// Human-readable window description, e.g. "the year 2025"
    pub window: String,
    pub utc_offset: String,
    pub coverage: Coverage,
    pub top_tracks: Vec<RankedEntry<TrackKey>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub track_peaks: Vec<TrackPeak>,
    pub top_artists: Vec<RankedEntry<String>>,
    pub top_albums: Vec<RankedEntry<AlbumKey>>,
    pub top_days: Vec<DayBucket>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_days_most_played: Vec<DayHighlight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_days_by_artists: Vec<DayBucket>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_days_by_tracks: Vec<DayBucket>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_tracks_peak_plays: Vec<PeakPlays>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaks: Option<Streaks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlyProfile>,
    /// Most played track of every active day, keyed by day label
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub calendar: IndexMap<String, DayTopTrack>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Coverage {
    /// Events in the report window
    pub events: usize,
    /// Events whose timestamp could be placed on a local day
    pub placed_events: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_day: Option<String>,
    pub days_active: usize,
}

/// Peak day of one of the top tracks.
#[derive(Debug, Deserialize, Serialize)]
pub struct TrackPeak {
    pub key: TrackKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak: Option<PeakDay>,
}

/// One of the busiest days with its most played track.
#[derive(Debug, Deserialize, Serialize)]
pub struct DayHighlight {
    pub day: String,
    pub plays: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_track: Option<DayTopTrack>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Streaks {
    pub tracks: Vec<Streak<TrackKey>>,
    pub artists: Vec<Streak<String>>,
    pub albums: Vec<Streak<AlbumKey>>,
}

impl Report {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report file: {}", path.display()))?;

        let report: Report = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON from: {}", path.display()))?;

        Ok(report)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report file: {}", path.display()))?;
        Ok(())
    }
}
