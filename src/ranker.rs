/// Grouped counting and top-N ranking.
///
/// Every "most played" query goes through [`Tally`]: counts are kept in
/// first-seen order and ranking uses a stable sort, so equal counts keep the
/// order in which their keys first appeared in the event list.
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::event::{AlbumKey, Event, TrackKey};
use crate::timefmt::parse_utc;

/// A key with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RankedEntry<K> {
    pub key: K,
    pub count: usize,
}

/// Occurrence counter that remembers the order keys were first seen.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    counts: IndexMap<K, usize>,
}

impl<K: Hash + Eq> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Highest count, earliest-seen key on ties.
    pub fn top(&self) -> Option<(&K, usize)> {
        let mut best: Option<(&K, usize)> = None;
        for (key, &count) in &self.counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((key, count));
            }
        }
        best
    }

    /// All entries by count descending, truncated to `n` when given.
    pub fn into_ranked(self, n: Option<usize>) -> Vec<RankedEntry<K>> {
        let mut entries: Vec<RankedEntry<K>> = self
            .counts
            .into_iter()
            .map(|(key, count)| RankedEntry { key, count })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        if let Some(n) = n {
            entries.truncate(n);
        }
        entries
    }
}

impl<K: Hash + Eq> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

/// Inclusive UTC range restricting which events a ranking counts.
///
/// `All` keeps every event, including those whose timestamp cannot be
/// parsed. Once any bound is supplied, unparsable events are dropped; a bound
/// whose own text cannot be parsed leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Between {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
}

impl DateRange {
    /// Build a range from bounds in the event timestamp format.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Self {
        let from = from.filter(|text| !text.is_empty());
        let to = to.filter(|text| !text.is_empty());
        if from.is_none() && to.is_none() {
            return DateRange::All;
        }

        let parse_bound = |text: &str| {
            let parsed = parse_utc(text);
            if parsed.is_none() {
                tracing::debug!(bound = text, "Ignoring unparsable date bound");
            }
            parsed
        };

        DateRange::Between {
            from: from.and_then(parse_bound),
            to: to.and_then(parse_bound),
        }
    }

    pub fn contains(&self, event: &Event) -> bool {
        match self {
            DateRange::All => true,
            DateRange::Between { from, to } => match parse_utc(&event.timestamp_utc) {
                Some(ts) => from.map_or(true, |f| ts >= f) && to.map_or(true, |t| ts <= t),
                None => false,
            },
        }
    }
}

/// Count events per key and return the `n` most frequent.
///
/// `key_fn` returns `None` for events that lack the fields the key needs.
pub fn rank<K, F>(events: &[Event], key_fn: F, n: usize, range: &DateRange) -> Vec<RankedEntry<K>>
where
    K: Hash + Eq,
    F: Fn(&Event) -> Option<K>,
{
    events
        .iter()
        .filter(|event| range.contains(event))
        .filter_map(key_fn)
        .collect::<Tally<K>>()
        .into_ranked(Some(n))
}

pub fn top_artists(events: &[Event], n: usize, range: &DateRange) -> Vec<RankedEntry<String>> {
    rank(events, Event::artist_key, n, range)
}

pub fn top_albums(events: &[Event], n: usize, range: &DateRange) -> Vec<RankedEntry<AlbumKey>> {
    rank(events, Event::album_key, n, range)
}

pub fn top_tracks(events: &[Event], n: usize, range: &DateRange) -> Vec<RankedEntry<TrackKey>> {
    rank(events, Event::track_key, n, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_events, timestamp};

    #[test]
    fn test_top_tracks_counts_raw_events() {
        let events = sample_events();
        let top = top_tracks(&events, 10, &DateRange::All);

        let names: Vec<&str> = top.iter().map(|e| e.key.track.as_str()).collect();
        assert_eq!(names, vec!["SongA", "SongC", "SongB", "SongD"]);

        let song_c = top.iter().find(|e| e.key.track == "SongC").unwrap();
        assert_eq!(song_c.count, 5);
        assert_eq!(song_c.key.artist, "Artist1");
    }

    #[test]
    fn test_tie_keeps_first_seen_order() {
        let events = vec![
            Event::new("X", "", "Late", "01 Jan 2026, 10:00"),
            Event::new("X", "", "Early", "01 Jan 2026, 09:00"),
            Event::new("X", "", "Late", "01 Jan 2026, 11:00"),
            Event::new("X", "", "Early", "01 Jan 2026, 12:00"),
            Event::new("X", "", "Early", "01 Jan 2026, 13:00"),
            Event::new("X", "", "Late", "01 Jan 2026, 14:00"),
        ];
        let top = top_tracks(&events, 1, &DateRange::All);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key.track, "Late");
        assert_eq!(top[0].count, 3);
    }

    #[test]
    fn test_top_n_bounded() {
        let events = sample_events();
        for n in 0..6 {
            let top = top_artists(&events, n, &DateRange::All);
            assert_eq!(top.len(), n.min(3));
        }
        assert_eq!(top_artists(&events, 3, &DateRange::All)[0].key, "Artist1");
        assert_eq!(top_artists(&events, 3, &DateRange::All)[0].count, 11);
    }

    #[test]
    fn test_top_albums() {
        let events = sample_events();
        let top = top_albums(&events, 5, &DateRange::All);
        assert_eq!(top[0].key, AlbumKey::new("Artist1", "Album1"));
        assert_eq!(top[0].count, 11);
        assert_eq!(top.len(), 3);
    }

    #[test]
    fn test_empty_fields_excluded() {
        let events = vec![
            Event::new("", "", "Song", "01 Jan 2026, 10:00"),
            Event::new("Artist", "", "", "01 Jan 2026, 10:00"),
        ];
        assert_eq!(top_artists(&events, 5, &DateRange::All).len(), 1);
        assert_eq!(top_tracks(&events, 5, &DateRange::All).len(), 1);
        assert!(top_albums(&events, 5, &DateRange::All).is_empty());
    }

    #[test]
    fn test_single_event_range() {
        let ts = timestamp(3, 0);
        let events = vec![Event::new("Solo", "Album", "Only", &ts)];

        let range = DateRange::parse(Some(ts.as_str()), Some(ts.as_str()));
        let top = top_tracks(&events, 5, &range);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key.track, "Only");
        assert_eq!(top[0].count, 1);

        let disjoint = DateRange::parse(Some(timestamp(10, 0).as_str()), Some(timestamp(12, 0).as_str()));
        assert!(top_tracks(&events, 5, &disjoint).is_empty());
    }

    #[test]
    fn test_unparsable_timestamps_and_filters() {
        let events = vec![
            Event::new("A", "", "T", ""),
            Event::new("A", "", "T", "garbage"),
            Event::new("A", "", "T", &timestamp(0, 0)),
        ];
        assert_eq!(top_tracks(&events, 5, &DateRange::All)[0].count, 3);

        let open_ended = DateRange::parse(Some(timestamp(0, 0).as_str()), None);
        assert_eq!(top_tracks(&events, 5, &open_ended)[0].count, 1);

        let bad_bound = DateRange::parse(Some("whenever"), None);
        assert_eq!(top_tracks(&events, 5, &bad_bound)[0].count, 1);

        assert_eq!(DateRange::parse(Some(""), None), DateRange::All);
    }

    #[test]
    fn test_range_filter_on_sample() {
        let events = sample_events();
        // Days 2 through 3 only.
        let range = DateRange::parse(Some(timestamp(2, 0).as_str()), Some(timestamp(3, 59).as_str()));
        let top = top_tracks(&events, 10, &range);
        assert_eq!(top[0].key.track, "SongD");
        assert_eq!(top[0].count, 4);
        assert_eq!(top.iter().map(|e| e.count).sum::<usize>(), 10);
    }

    #[test]
    fn test_tally_top_and_ranking() {
        let tally: Tally<&str> = ["b", "a", "a", "b", "c"].into_iter().collect();
        assert_eq!(tally.top(), Some((&"b", 2)));
        let keys: Vec<&str> = tally.into_ranked(None).into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert!(Tally::<&str>::new().top().is_none());
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let events = sample_events();
        assert_eq!(
            top_tracks(&events, 3, &DateRange::All),
            top_tracks(&events, 3, &DateRange::All)
        );
    }
}
