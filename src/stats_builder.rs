/// Report assembly.
///
/// Runs every analytics query over one event list and collects the results
/// into a [`Report`] for the renderers.
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::config::ReportConfig;
use crate::days;
use crate::event::Event;
use crate::hourly;
use crate::ranker::{self, DateRange};
use crate::stats::*;
use crate::streaks;
use crate::timefmt::{day_label, local_day};
use crate::window::Window;

/// Coverage bounds tracking (private).
struct CoverageBounds {
    events: usize,
    placed: usize,
    active_days: BTreeSet<NaiveDate>,
}

impl CoverageBounds {
    fn from_events(events: &[Event], config: &ReportConfig) -> Self {
        let active_days: Vec<NaiveDate> = events
            .iter()
            .filter_map(|e| local_day(&e.timestamp_utc, config.offset))
            .collect();
        Self {
            events: events.len(),
            placed: active_days.len(),
            active_days: active_days.into_iter().collect(),
        }
    }

    fn into_coverage(self) -> Coverage {
        Coverage {
            events: self.events,
            placed_events: self.placed,
            first_day: self.active_days.first().map(day_label),
            last_day: self.active_days.last().map(day_label),
            days_active: self.active_days.len(),
        }
    }
}

/// Builds a report from the events of one window.
///
/// # Arguments
///
/// * `events` - Events already restricted to `window`
/// * `window` - Window the events were selected with, used for labelling
/// * `config` - Ranking sizes and local offset
pub fn build_report(events: &[Event], window: &Window, config: &ReportConfig) -> Result<Report> {
    config.validate()?;
    let offset = config.offset;
    let all = DateRange::All;

    let top_tracks = ranker::top_tracks(events, config.items, &all);
    let track_peaks = top_tracks
        .iter()
        .map(|entry| TrackPeak {
            key: entry.key.clone(),
            peak: days::peak_day_for_track(events, offset, &entry.key.artist, &entry.key.track),
        })
        .collect();

    let top_days = days::top_days_by_play_count(events, offset, config.days);
    let calendar = days::top_track_per_day(events, offset);
    let top_days_most_played = top_days
        .iter()
        .map(|bucket| {
            let label = bucket.label();
            DayHighlight {
                top_track: calendar.get(&label).cloned(),
                day: label,
                plays: bucket.value,
            }
        })
        .collect();

    let coverage = CoverageBounds::from_events(events, config).into_coverage();
    let (streaks, hourly) = if coverage.placed_events > 0 {
        (
            Some(Streaks {
                tracks: streaks::track_streaks(events, offset, config.days),
                artists: streaks::artist_streaks(events, offset, config.days),
                albums: streaks::album_streaks(events, offset, config.days),
            }),
            Some(hourly::hourly_profile(events, offset)),
        )
    } else {
        (None, None)
    };

    let report = Report {
        schema_version: SCHEMA_VERSION,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        window: window.phrase(),
        utc_offset: offset.to_string(),
        top_tracks,
        track_peaks,
        top_artists: ranker::top_artists(events, config.items, &all),
        top_albums: ranker::top_albums(events, config.items, &all),
        top_days,
        top_days_most_played,
        top_days_by_artists: days::top_days_by_distinct_artists(events, offset, config.days),
        top_days_by_tracks: days::top_days_by_distinct_tracks(events, offset, config.days),
        top_tracks_peak_plays: days::top_tracks_by_peak_plays(events, offset, config.peak_plays),
        streaks,
        hourly,
        calendar,
        coverage,
    };

    tracing::info!(
        events = report.coverage.events,
        days_active = report.coverage.days_active,
        "Built report"
    );

    Ok(report)
}
