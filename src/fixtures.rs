//! Synthetic listening history shared by unit tests.
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::event::Event;
use crate::timefmt::TIMESTAMP_FORMAT;

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 2, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Local day `offset` days after 01 Feb 2026 (UTC offset in tests).
pub fn day(offset: i64) -> NaiveDate {
    base().date() + Duration::days(offset)
}

/// UTC timestamp text for `day(offset)` at 12:`minute`.
pub fn timestamp(day_offset: i64, minute: i64) -> String {
    (base() + Duration::days(day_offset) + Duration::minutes(minute))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

fn push(events: &mut Vec<Event>, artist: &str, album: &str, track: &str, day: i64, times: i64) {
    for i in 0..times {
        let at = base() + Duration::days(day) + Duration::minutes(i);
        let mut event = Event::new(artist, album, track, &at.format(TIMESTAMP_FORMAT).to_string());
        event.raw_epoch = at.and_utc().timestamp().to_string();
        event.permalink = format!("https://music.example/{}/{}", artist, track);
        events.push(event);
    }
}

/// Twenty plays over six days.
///
/// - SongC: days 0..=3, twice on day 1 (5 plays)
/// - SongA: days 0..=2 with three plays on day 2, plus day 5 (6 plays)
/// - SongB: days 1, 2 and twice on day 4 (4 plays)
/// - SongD: four plays on day 2
pub fn sample_events() -> Vec<Event> {
    let mut events = Vec::new();

    push(&mut events, "Artist1", "Album1", "SongC", 0, 1);
    push(&mut events, "Artist1", "Album1", "SongC", 1, 2);
    push(&mut events, "Artist1", "Album1", "SongC", 2, 1);
    push(&mut events, "Artist1", "Album1", "SongC", 3, 1);

    push(&mut events, "Artist1", "Album1", "SongA", 0, 1);
    push(&mut events, "Artist1", "Album1", "SongA", 1, 1);
    push(&mut events, "Artist1", "Album1", "SongA", 2, 3);
    push(&mut events, "Artist1", "Album1", "SongA", 5, 1);

    push(&mut events, "Artist2", "Album2", "SongB", 1, 1);
    push(&mut events, "Artist2", "Album2", "SongB", 2, 1);
    push(&mut events, "Artist2", "Album2", "SongB", 4, 2);

    push(&mut events, "Artist3", "Album3", "SongD", 2, 4);

    events
}
