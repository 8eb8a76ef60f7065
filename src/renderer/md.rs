use crate::days::{DayBucket, DayTopTrack};
use crate::event::{AlbumKey, TrackKey};
use crate::hourly::{busiest_hour, HourlyProfile};
use crate::ranker::RankedEntry;
use crate::stats::*;
use crate::streaks::Streak;
use anyhow::Result;
use indexmap::IndexMap;

/// Render a report to Markdown
pub fn render(report: &Report) -> Result<String> {
    let mut output = String::new();

    render_header(&mut output, report);
    render_summary(&mut output, report);
    render_tracks(&mut output, report);
    render_artists(&mut output, &report.top_artists);
    render_albums(&mut output, &report.top_albums);
    render_days(&mut output, report);

    if let Some(ref streaks) = report.streaks {
        render_streaks(&mut output, streaks);
    }

    if let Some(ref hourly) = report.hourly {
        render_hourly(&mut output, hourly);
    }

    render_calendar(&mut output, &report.calendar);

    Ok(output)
}

fn render_header(output: &mut String, report: &Report) {
    output.push_str("# 🎧 Your Listening Recap\n");
    output.push_str(&format!(
        "*Covering {}. Generated {} (UTC{}).*\n\n",
        report.window, report.generated_at, report.utc_offset
    ));
}

fn render_summary(output: &mut String, report: &Report) {
    let coverage = &report.coverage;
    output.push_str("### 📊 Summary\n");
    output.push_str(&format!(
        "- 🎵 **Plays:** {}\n",
        format_number(coverage.events)
    ));
    output.push_str(&format!(
        "- 🔥 **Active days:** {}\n",
        format_number(coverage.days_active)
    ));
    if let (Some(first), Some(last)) = (&coverage.first_day, &coverage.last_day) {
        output.push_str(&format!("- 📅 **From:** {} **to** {}\n", first, last));
    }
    if let Some((hour, plays)) = report.hourly.as_ref().and_then(busiest_hour) {
        if plays > 0 {
            output.push_str(&format!(
                "- 🕐 **Busiest hour:** {:0>2}:00 ({} plays)\n",
                hour,
                format_number(plays)
            ));
        }
    }
    let unplaced = coverage.events.saturating_sub(coverage.placed_events);
    if unplaced > 0 {
        output.push_str(&format!(
            "\n*{} plays without a usable timestamp are only counted in the rankings.*\n",
            format_number(unplaced)
        ));
    }
    output.push('\n');
}

fn render_tracks(output: &mut String, report: &Report) {
    if report.top_tracks.is_empty() {
        return;
    }

    output.push_str("### 🎶 Top Tracks\n");
    output.push_str("| Rank | Track | Artist | Plays | Peak day |\n");
    output.push_str("| ---- | ----- | ------ | ----- | -------- |\n");

    for (i, entry) in report.top_tracks.iter().enumerate() {
        let peak = report
            .track_peaks
            .iter()
            .find(|p| p.key == entry.key)
            .and_then(|p| p.peak.as_ref())
            .map(|p| format!("{} ({})", crate::timefmt::day_label(&p.day), p.plays))
            .unwrap_or_else(|| String::from("-"));
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            i + 1,
            escape(&entry.key.track),
            escape(&entry.key.artist),
            format_number(entry.count),
            peak
        ));
    }
    output.push('\n');

    if !report.top_tracks_peak_plays.is_empty() {
        output.push_str("**Most plays in a single day**\n\n");
        output.push_str("| Rank | Track | Artist | Plays | Day |\n");
        output.push_str("| ---- | ----- | ------ | ----- | --- |\n");
        for (i, peak) in report.top_tracks_peak_plays.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i + 1,
                escape(&peak.key.track),
                escape(&peak.key.artist),
                format_number(peak.plays),
                crate::timefmt::day_label(&peak.day)
            ));
        }
        output.push('\n');
    }
}

fn render_artists(output: &mut String, artists: &[RankedEntry<String>]) {
    if artists.is_empty() {
        return;
    }

    output.push_str("### 🎤 Top Artists\n");
    output.push_str("| Rank | Artist | Plays |\n");
    output.push_str("| ---- | ------ | ----- |\n");
    for (i, entry) in artists.iter().enumerate() {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            i + 1,
            escape(&entry.key),
            format_number(entry.count)
        ));
    }
    output.push('\n');
}

fn render_albums(output: &mut String, albums: &[RankedEntry<AlbumKey>]) {
    if albums.is_empty() {
        return;
    }

    output.push_str("### 💿 Top Albums\n");
    output.push_str("| Rank | Album | Artist | Plays |\n");
    output.push_str("| ---- | ----- | ------ | ----- |\n");
    for (i, entry) in albums.iter().enumerate() {
        let artist = if entry.key.artist.is_empty() {
            "-".to_string()
        } else {
            escape(&entry.key.artist)
        };
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            i + 1,
            escape(&entry.key.album),
            artist,
            format_number(entry.count)
        ));
    }
    output.push('\n');
}

fn render_days(output: &mut String, report: &Report) {
    if report.top_days.is_empty() {
        return;
    }

    output.push_str("### 📆 Biggest Days\n");
    output.push_str("| Rank | Day | Plays | Top track |\n");
    output.push_str("| ---- | --- | ----- | --------- |\n");
    for (i, highlight) in report.top_days_most_played.iter().enumerate() {
        let top = highlight
            .top_track
            .as_ref()
            .map(track_link)
            .unwrap_or_else(|| String::from("-"));
        output.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            i + 1,
            highlight.day,
            format_number(highlight.plays),
            top
        ));
    }
    output.push('\n');

    render_day_table(output, "Most artists in a day", "Artists", &report.top_days_by_artists);
    render_day_table(output, "Most tracks in a day", "Tracks", &report.top_days_by_tracks);
}

fn render_day_table(output: &mut String, title: &str, column: &str, days: &[DayBucket]) {
    if days.is_empty() {
        return;
    }

    output.push_str(&format!("**{}**\n\n", title));
    output.push_str(&format!("| Rank | Day | {} |\n", column));
    output.push_str(&format!("| ---- | --- | {} |\n", "-".repeat(column.len())));
    for (i, bucket) in days.iter().enumerate() {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            i + 1,
            bucket.label(),
            format_number(bucket.value)
        ));
    }
    output.push('\n');
}

fn render_streaks(output: &mut String, streaks: &Streaks) {
    if streaks.tracks.is_empty() && streaks.artists.is_empty() && streaks.albums.is_empty() {
        return;
    }

    output.push_str("### 🔁 Streaks\n");
    render_streak_table(output, "Tracks", &streaks.tracks, |k: &TrackKey| {
        format!("{} – {}", escape(&k.artist), escape(&k.track))
    });
    render_streak_table(output, "Artists", &streaks.artists, |k: &String| escape(k));
    render_streak_table(output, "Albums", &streaks.albums, |k: &AlbumKey| {
        format!("{} – {}", escape(&k.artist), escape(&k.album))
    });
}

fn render_streak_table<K>(
    output: &mut String,
    title: &str,
    streaks: &[Streak<K>],
    name: impl Fn(&K) -> String,
) {
    if streaks.is_empty() {
        return;
    }

    output.push_str(&format!("**{}**\n\n", title));
    output.push_str("| Rank | Name | Days | From | To |\n");
    output.push_str("| ---- | ---- | ---- | ---- | -- |\n");
    for (i, streak) in streaks.iter().enumerate() {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            i + 1,
            name(&streak.key),
            streak.length,
            crate::timefmt::day_label(&streak.start),
            crate::timefmt::day_label(&streak.end)
        ));
    }
    output.push('\n');
}

fn render_hourly(output: &mut String, hourly: &HourlyProfile) {
    output.push_str("### 🕐 By hour (local time)\n");

    for (start, end) in [(0, 12), (12, 24)] {
        let header: Vec<String> = (start..end).map(|h| format!("{:02}", h)).collect();
        output.push_str(&format!("| {} |\n", header.join(" | ")));
        output.push_str(&format!("|{}\n", " -- |".repeat(end - start)));
        output.push('|');
        for hour in start..end {
            let total = hourly
                .get(hour.to_string().as_str())
                .map(|slot| slot.total)
                .unwrap_or(0);
            output.push_str(&format!(" {} |", format_number(total)));
        }
        output.push_str("\n\n");
    }

    let mut favourites = hourly
        .iter()
        .filter_map(|(hour, slot)| slot.top_artist.as_ref().map(|a| (hour, slot, a)))
        .peekable();
    if favourites.peek().is_none() {
        return;
    }

    output.push_str("**Favourites by hour**\n\n");
    output.push_str("| Hour | Artist | Track |\n");
    output.push_str("| ---- | ------ | ----- |\n");
    for (hour, slot, artist) in favourites {
        let track = slot
            .top_track
            .as_ref()
            .map(|t| format!("{} ({})", escape(&t.key.track), t.count))
            .unwrap_or_else(|| String::from("-"));
        output.push_str(&format!(
            "| {:0>2} | {} ({}) | {} |\n",
            hour,
            escape(&artist.key),
            artist.count,
            track
        ));
    }
    output.push('\n');
}

fn render_calendar(output: &mut String, calendar: &IndexMap<String, DayTopTrack>) {
    if calendar.is_empty() {
        return;
    }

    output.push_str("### 🗓️ Track of the Day\n");
    output.push_str("| Day | Track | Plays |\n");
    output.push_str("| --- | ----- | ----- |\n");
    for (day, top) in calendar {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            day,
            track_link(top),
            format_number(top.plays)
        ));
    }
    output.push('\n');
}

/// "Artist – Track", linked to the track page when known
fn track_link(top: &DayTopTrack) -> String {
    let text = format!("{} – {}", escape(&top.artist), escape(&top.track));
    match top.permalink {
        Some(ref url) => format!("[{}]({})", text, url),
        None => text,
    }
}

/// Keep pipes in names from breaking table cells
fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Format a number with thousand separators
fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped_rev = String::new();

    for (count, ch) in digits.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped_rev.push(',');
        }
        grouped_rev.push(ch);
    }

    grouped_rev.chars().rev().collect()
}
