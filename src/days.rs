/// Per-day aggregation of listening events.
///
/// Events are placed on local calendar days through the run's offset; events
/// whose timestamp cannot be parsed are skipped. Days with equal metrics keep
/// the order in which they first appear in the event list.
use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::event::{Event, TrackKey};
use crate::ranker::Tally;
use crate::timefmt::{day_label, local_day, serde_day, LocalOffset};

/// A local day with a metric (plays, distinct artists, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DayBucket {
    #[serde(with = "serde_day")]
    pub day: NaiveDate,
    pub value: usize,
}

impl DayBucket {
    pub fn label(&self) -> String {
        day_label(&self.day)
    }
}

/// The most played track of one day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DayTopTrack {
    pub artist: String,
    pub track: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    pub plays: usize,
}

/// The day a track was played the most.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PeakDay {
    #[serde(with = "serde_day")]
    pub day: NaiveDate,
    /// Plays on the peak day.
    pub plays: usize,
    /// All plays of the track, including those that cannot be placed on a day.
    pub total: usize,
}

/// A track ranked by its single-day peak.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PeakPlays {
    pub key: TrackKey,
    pub plays: usize,
    #[serde(with = "serde_day")]
    pub day: NaiveDate,
}

fn placed<'a>(
    events: &'a [Event],
    offset: LocalOffset,
) -> impl Iterator<Item = (NaiveDate, &'a Event)> + 'a {
    events
        .iter()
        .filter_map(move |event| local_day(&event.timestamp_utc, offset).map(|day| (day, event)))
}

fn into_buckets(tally: Tally<NaiveDate>, n: Option<usize>) -> Vec<DayBucket> {
    tally
        .into_ranked(n)
        .into_iter()
        .map(|entry| DayBucket {
            day: entry.key,
            value: entry.count,
        })
        .collect()
}

/// The `n` days with the most plays.
pub fn top_days_by_play_count(events: &[Event], offset: LocalOffset, n: usize) -> Vec<DayBucket> {
    let tally: Tally<NaiveDate> = placed(events, offset).map(|(day, _)| day).collect();
    into_buckets(tally, Some(n))
}

fn top_days_by_distinct<K, F>(events: &[Event], offset: LocalOffset, n: usize, key_fn: F) -> Vec<DayBucket>
where
    K: Hash + Eq,
    F: Fn(&Event) -> Option<K>,
{
    let mut per_day: IndexMap<NaiveDate, IndexSet<K>> = IndexMap::new();
    for (day, event) in placed(events, offset) {
        if let Some(key) = key_fn(event) {
            per_day.entry(day).or_default().insert(key);
        }
    }

    let mut buckets: Vec<DayBucket> = per_day
        .into_iter()
        .map(|(day, keys)| DayBucket {
            day,
            value: keys.len(),
        })
        .collect();
    buckets.sort_by(|a, b| b.value.cmp(&a.value));
    buckets.truncate(n);
    buckets
}

/// The `n` days with the most distinct artists.
pub fn top_days_by_distinct_artists(events: &[Event], offset: LocalOffset, n: usize) -> Vec<DayBucket> {
    top_days_by_distinct(events, offset, n, Event::artist_key)
}

/// The `n` days with the most distinct (artist, track) pairs.
pub fn top_days_by_distinct_tracks(events: &[Event], offset: LocalOffset, n: usize) -> Vec<DayBucket> {
    top_days_by_distinct(events, offset, n, Event::track_key)
}

/// The most played track of every day, keyed by day label in first-seen order.
///
/// Artwork and permalink come from the first event of that track in the whole
/// list, so the result depends on input order when metadata differs between
/// plays.
pub fn top_track_per_day(events: &[Event], offset: LocalOffset) -> IndexMap<String, DayTopTrack> {
    let mut first_play: IndexMap<TrackKey, &Event> = IndexMap::new();
    for event in events {
        if let Some(key) = event.track_key() {
            first_play.entry(key).or_insert(event);
        }
    }

    let mut per_day: IndexMap<NaiveDate, Tally<TrackKey>> = IndexMap::new();
    for (day, event) in placed(events, offset) {
        if let Some(key) = event.track_key() {
            per_day.entry(day).or_default().add(key);
        }
    }

    let mut result = IndexMap::new();
    for (day, tally) in &per_day {
        let Some((key, plays)) = tally.top() else {
            continue;
        };
        let source = first_play.get(key);
        result.insert(
            day_label(day),
            DayTopTrack {
                artist: key.artist.clone(),
                track: key.track.clone(),
                image_url: source.and_then(|e| e.artwork()).map(str::to_string),
                permalink: source.and_then(|e| e.permalink()).map(str::to_string),
                plays,
            },
        );
    }
    result
}

fn track_day_tally(events: &[Event], offset: LocalOffset, artist: &str, track: &str) -> (Tally<NaiveDate>, usize) {
    let mut total = 0;
    let mut tally = Tally::new();
    for event in events.iter().filter(|e| e.is_track(artist, track)) {
        total += 1;
        if let Some(day) = local_day(&event.timestamp_utc, offset) {
            tally.add(day);
        }
    }
    (tally, total)
}

/// The local day on which a track was played the most.
pub fn peak_day_for_track(events: &[Event], offset: LocalOffset, artist: &str, track: &str) -> Option<PeakDay> {
    let (tally, total) = track_day_tally(events, offset, artist, track);
    let (day, plays) = tally.top()?;
    Some(PeakDay {
        day: *day,
        plays,
        total,
    })
}

/// Every local day a track was played on, most plays first.
pub fn all_days_for_track(
    events: &[Event],
    offset: LocalOffset,
    artist: &str,
    track: &str,
) -> Option<Vec<DayBucket>> {
    let (tally, _) = track_day_tally(events, offset, artist, track);
    if tally.is_empty() {
        return None;
    }
    Some(into_buckets(tally, None))
}

/// The `n` tracks with the highest single-day play count.
pub fn top_tracks_by_peak_plays(events: &[Event], offset: LocalOffset, n: usize) -> Vec<PeakPlays> {
    let mut per_track: IndexMap<TrackKey, Tally<NaiveDate>> = IndexMap::new();
    for (day, event) in placed(events, offset) {
        if let Some(key) = event.track_key() {
            per_track.entry(key).or_default().add(day);
        }
    }

    let mut peaks: Vec<PeakPlays> = per_track
        .into_iter()
        .filter_map(|(key, tally)| {
            let (day, plays) = tally.top()?;
            Some(PeakPlays {
                plays,
                day: *day,
                key,
            })
        })
        .collect();
    peaks.sort_by(|a, b| b.plays.cmp(&a.plays));
    peaks.truncate(n);
    peaks
}
