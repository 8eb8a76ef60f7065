/// Longest runs of consecutive listening days per track, artist or album.
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::Hash;

use crate::event::{AlbumKey, Event, TrackKey};
use crate::timefmt::{local_day, serde_day, LocalOffset};

/// The longest run of consecutive local days on which `key` was played.
///
/// `end - start` is always `length - 1` days.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Streak<K> {
    pub key: K,
    pub length: usize,
    #[serde(with = "serde_day")]
    pub start: NaiveDate,
    #[serde(with = "serde_day")]
    pub end: NaiveDate,
}

/// Longest run in an ascending set of days, as (length, start, end).
///
/// The earliest run wins when two runs have the same length.
fn longest_run(days: &BTreeSet<NaiveDate>) -> Option<(usize, NaiveDate, NaiveDate)> {
    let mut best: Option<(usize, NaiveDate, NaiveDate)> = None;
    let mut current: Option<(usize, NaiveDate)> = None;
    let mut prev_day: Option<NaiveDate> = None;

    for &day in days {
        current = match (current, prev_day) {
            (Some((length, start)), Some(prev)) if (day - prev).num_days() == 1 => {
                Some((length + 1, start))
            }
            (Some((length, start)), Some(prev)) => {
                if best.map_or(true, |(best_length, _, _)| length > best_length) {
                    best = Some((length, start, prev));
                }
                Some((1, day))
            }
            _ => Some((1, day)),
        };
        prev_day = Some(day);
    }

    // Close the final run
    if let (Some((length, start)), Some(prev)) = (current, prev_day) {
        if best.map_or(true, |(best_length, _, _)| length > best_length) {
            best = Some((length, start, prev));
        }
    }

    best
}

fn days_per_key<K, F>(events: &[Event], offset: LocalOffset, key_fn: F) -> IndexMap<K, BTreeSet<NaiveDate>>
where
    K: Hash + Eq,
    F: Fn(&Event) -> Option<K>,
{
    let mut per_key: IndexMap<K, BTreeSet<NaiveDate>> = IndexMap::new();
    for event in events {
        let Some(key) = key_fn(event) else {
            continue;
        };
        if let Some(day) = local_day(&event.timestamp_utc, offset) {
            per_key.entry(key).or_default().insert(day);
        }
    }
    per_key
}

/// The `n` keys with the longest daily streaks.
///
/// Keys with equal streak lengths keep the order in which they first appear
/// in the event list.
pub fn longest_streaks<K, F>(events: &[Event], offset: LocalOffset, key_fn: F, n: usize) -> Vec<Streak<K>>
where
    K: Hash + Eq,
    F: Fn(&Event) -> Option<K>,
{
    let mut streaks: Vec<Streak<K>> = days_per_key(events, offset, key_fn)
        .into_iter()
        .filter_map(|(key, days)| {
            let (length, start, end) = longest_run(&days)?;
            Some(Streak {
                key,
                length,
                start,
                end,
            })
        })
        .collect();

    streaks.sort_by(|a, b| b.length.cmp(&a.length));
    streaks.truncate(n);
    tracing::trace!(returned = streaks.len(), "Computed streaks");
    streaks
}

/// Track streaks; events need both artist and track names.
pub fn track_streaks(events: &[Event], offset: LocalOffset, n: usize) -> Vec<Streak<TrackKey>> {
    longest_streaks(events, offset, Event::attributed_track_key, n)
}

pub fn artist_streaks(events: &[Event], offset: LocalOffset, n: usize) -> Vec<Streak<String>> {
    longest_streaks(events, offset, Event::artist_key, n)
}

/// Album streaks; events need both artist and album names.
pub fn album_streaks(events: &[Event], offset: LocalOffset, n: usize) -> Vec<Streak<AlbumKey>> {
    longest_streaks(events, offset, Event::attributed_album_key, n)
}
