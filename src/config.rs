/// Report configuration collected from the command line.
///
/// The analytics functions accept any `n`; the ranges below are enforced here,
/// at the calling layer.
use anyhow::{bail, Result};
use std::ops::RangeInclusive;

use crate::timefmt::LocalOffset;

pub const DEFAULT_ITEMS: usize = 20;
pub const DEFAULT_DAYS: usize = 5;

/// Allowed number of tracks, artists and albums per ranking.
pub const ITEMS_RANGE: RangeInclusive<usize> = 5..=100;
/// Allowed number of days (and streak / peak entries).
pub const DAYS_RANGE: RangeInclusive<usize> = 3..=20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    /// Entries in the track, artist and album rankings
    pub items: usize,
    /// Entries in the day rankings and streak tables
    pub days: usize,
    /// Entries in the single-day peak ranking
    pub peak_plays: usize,
    /// Offset used to place events on local days and hours
    pub offset: LocalOffset,
}

impl ReportConfig {
    pub fn new(offset: LocalOffset) -> Self {
        Self {
            items: DEFAULT_ITEMS,
            days: DEFAULT_DAYS,
            peak_plays: DEFAULT_DAYS,
            offset,
        }
    }

    /// Build from optional command-line values, falling back to defaults and
    /// to the system offset.
    pub fn from_args(
        items: Option<usize>,
        days: Option<usize>,
        peak_plays: Option<usize>,
        utc_offset: Option<&str>,
    ) -> Result<Self> {
        let offset = match utc_offset {
            Some(text) => LocalOffset::parse(text)?,
            None => LocalOffset::system(),
        };

        let mut config = Self::new(offset);
        if let Some(items) = items {
            config.items = items;
        }
        if let Some(days) = days {
            config.days = days;
            config.peak_plays = days;
        }
        if let Some(peak_plays) = peak_plays {
            config.peak_plays = peak_plays;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !ITEMS_RANGE.contains(&self.items) {
            bail!(
                "--items must be between {} and {} (got {})",
                ITEMS_RANGE.start(),
                ITEMS_RANGE.end(),
                self.items
            );
        }
        if !DAYS_RANGE.contains(&self.days) {
            bail!(
                "--days must be between {} and {} (got {})",
                DAYS_RANGE.start(),
                DAYS_RANGE.end(),
                self.days
            );
        }
        if !DAYS_RANGE.contains(&self.peak_plays) {
            bail!(
                "--peak-plays must be between {} and {} (got {})",
                DAYS_RANGE.start(),
                DAYS_RANGE.end(),
                self.peak_plays
            );
        }
        Ok(())
    }
}
