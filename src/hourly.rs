/// Distribution of plays over the 24 local hours of the day.
use chrono::Timelike;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::event::{Event, TrackKey};
use crate::ranker::{RankedEntry, Tally};
use crate::timefmt::{to_local, LocalOffset};

const HOURS: usize = 24;

/// Plays within one hour of the day, across all days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HourSlot {
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_artist: Option<RankedEntry<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_track: Option<RankedEntry<TrackKey>>,
}

/// Hour slots keyed `"0"` through `"23"`, always all 24 of them.
pub type HourlyProfile = IndexMap<String, HourSlot>;

fn top_entry<K: std::hash::Hash + Eq + Clone>(tally: &Tally<K>) -> Option<RankedEntry<K>> {
    tally.top().map(|(key, count)| RankedEntry {
        key: key.clone(),
        count,
    })
}

/// Bucket events by local hour of day.
pub fn hourly_profile(events: &[Event], offset: LocalOffset) -> HourlyProfile {
    let mut totals = [0usize; HOURS];
    let mut artists: Vec<Tally<String>> = (0..HOURS).map(|_| Tally::new()).collect();
    let mut tracks: Vec<Tally<TrackKey>> = (0..HOURS).map(|_| Tally::new()).collect();

    for event in events {
        let Some(local) = to_local(&event.timestamp_utc, offset) else {
            continue;
        };
        let hour = local.hour() as usize;
        totals[hour] += 1;
        if let Some(artist) = event.artist_key() {
            artists[hour].add(artist);
        }
        if let Some(track) = event.track_key() {
            tracks[hour].add(track);
        }
    }

    (0..HOURS)
        .map(|hour| {
            let slot = HourSlot {
                total: totals[hour],
                top_artist: top_entry(&artists[hour]),
                top_track: top_entry(&tracks[hour]),
            };
            (hour.to_string(), slot)
        })
        .collect()
}

/// The hour with the most plays, earliest hour on ties. `None` when nothing was played.
pub fn busiest_hour(profile: &HourlyProfile) -> Option<(&str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for (hour, slot) in profile {
        if slot.total > best.map_or(0, |(_, total)| total) {
            best = Some((hour.as_str(), slot.total));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_events;

    #[test]
    fn test_profile_has_all_hours() {
        let profile = hourly_profile(&[], LocalOffset::utc());
        assert_eq!(profile.len(), 24);
        let keys: Vec<&str> = profile.keys().map(String::as_str).collect();
        assert_eq!(keys.first(), Some(&"0"));
        assert_eq!(keys.last(), Some(&"23"));
        assert!(profile.values().all(|slot| slot == &HourSlot::default()));
        assert_eq!(busiest_hour(&profile), None);
    }

    #[test]
    fn test_profile_of_sample() {
        let profile = hourly_profile(&sample_events(), LocalOffset::utc());
        let noon = &profile["12"];
        assert_eq!(noon.total, 20);
        assert_eq!(
            noon.top_artist,
            Some(RankedEntry {
                key: "Artist1".to_string(),
                count: 11
            })
        );
        assert_eq!(noon.top_track.as_ref().unwrap().key.track, "SongA");
        assert_eq!(noon.top_track.as_ref().unwrap().count, 6);
        assert_eq!(profile["13"].total, 0);
        assert_eq!(busiest_hour(&profile), Some(("12", 20)));
    }

    #[test]
    fn test_profile_uses_offset() {
        let events = vec![
            Event::new("A", "", "T", "01 Feb 2026, 23:10"),
            Event::new("", "", "", "01 Feb 2026, 23:20"),
            Event::new("A", "", "T", "not a time"),
        ];
        let profile = hourly_profile(&events, LocalOffset::parse("+02:00").unwrap());
        assert_eq!(profile["1"].total, 2);
        assert_eq!(profile["1"].top_artist.as_ref().unwrap().count, 1);
        assert_eq!(profile["23"].total, 0);
        assert_eq!(profile.values().map(|s| s.total).sum::<usize>(), 2);
    }

    #[test]
    fn test_profile_is_idempotent() {
        let events = sample_events();
        let offset = LocalOffset::utc();
        assert_eq!(hourly_profile(&events, offset), hourly_profile(&events, offset));
    }
}
