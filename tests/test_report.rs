use anyhow::Result;
use serde_json::json;
use std::path::Path;

use plays::config::ReportConfig;
use plays::stats::Report;
use plays::timefmt::LocalOffset;
use plays::window::Window;
use plays::{loader, renderer, stats_builder};

/// One export page in the API shape, `(artist, album, track, epoch)` per play.
fn write_export(dir: &Path, name: &str, plays: &[(&str, &str, &str, i64)]) -> Result<std::path::PathBuf> {
    let tracks: Vec<_> = plays
        .iter()
        .map(|(artist, album, track, epoch)| {
            let text = chrono::DateTime::from_timestamp(*epoch, 0)
                .map(|dt| dt.format("%d %b %Y, %H:%M").to_string())
                .unwrap_or_default();
            json!({
                "artist": {"mbid": "", "#text": artist},
                "album": {"mbid": "", "#text": album},
                "name": track,
                "url": format!("https://music.example/{}/{}", artist, track),
                "image": [
                    {"size": "medium", "#text": format!("{}-m.png", track)},
                    {"size": "large", "#text": format!("{}-l.png", track)}
                ],
                "date": {"uts": epoch.to_string(), "#text": text}
            })
        })
        .collect();

    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&json!({"recenttracks": {"track": tracks}}))?)?;
    Ok(path)
}

// 2026-02-01 12:00 UTC
const FEB_1: i64 = 1_769_947_200;
const DAY: i64 = 86_400;

fn sample_plays() -> Vec<(&'static str, &'static str, &'static str, i64)> {
    vec![
        ("Artist1", "Album1", "SongC", FEB_1),
        ("Artist1", "Album1", "SongC", FEB_1 + DAY),
        ("Artist1", "Album1", "SongC", FEB_1 + DAY + 60),
        ("Artist1", "Album1", "SongC", FEB_1 + 2 * DAY),
        ("Artist1", "Album1", "SongA", FEB_1 + 2 * DAY + 60),
        ("Artist2", "Album2", "SongB", FEB_1 + 40 * DAY),
    ]
}

fn utc_config() -> ReportConfig {
    ReportConfig::new(LocalOffset::utc())
}

#[test]
fn test_load_export_and_build_report() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_export(dir.path(), "scrobbles-test.json", &sample_plays())?;
    std::fs::write(dir.path().join("notes.txt"), "not an export")?;

    assert_eq!(loader::list_files(dir.path())?, vec![path.clone()]);

    let events = loader::load_file(&path)?;
    assert_eq!(events.len(), 6);
    assert_eq!(events[0].artwork(), Some("SongC-l.png"));

    let report = stats_builder::build_report(&events, &Window::life(), &utc_config())?;
    assert_eq!(report.top_tracks[0].key.track, "SongC");
    assert_eq!(report.top_tracks[0].count, 4);
    assert_eq!(report.coverage.days_active, 4);

    let streaks = report.streaks.as_ref().expect("streaks for dated events");
    assert_eq!(streaks.tracks[0].length, 3);
    assert_eq!(report.calendar["02 Feb 2026"].plays, 2);

    let markdown = renderer::md::render(&report)?;
    assert!(markdown.contains("### 🎶 Top Tracks"));
    Ok(())
}

#[test]
fn test_window_restricts_report() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_export(dir.path(), "scrobbles-test.json", &sample_plays())?;
    let events = loader::load_file(&path)?;

    let window = Window::parse("2026-03")?;
    let events = window.retain(events, LocalOffset::utc());
    assert_eq!(events.len(), 1);

    let report = stats_builder::build_report(&events, &window, &utc_config())?;
    assert_eq!(report.window, "the month 2026-03");
    assert_eq!(report.top_artists[0].key, "Artist2");
    Ok(())
}

#[test]
fn test_report_json_roundtrip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_export(dir.path(), "scrobbles-test.json", &sample_plays())?;
    let events = loader::load_file(&path)?;
    let report = stats_builder::build_report(&events, &Window::life(), &utc_config())?;

    let json_path = dir.path().join("plays-life.json");
    report.save_to_file(&json_path)?;
    let loaded = Report::load_from_file(&json_path)?;

    assert_eq!(loaded.schema_version, report.schema_version);
    assert_eq!(loaded.top_tracks, report.top_tracks);
    assert_eq!(loaded.top_days, report.top_days);
    assert_eq!(loaded.calendar, report.calendar);
    assert_eq!(
        renderer::md::render(&loaded)?,
        renderer::md::render(&report)?
    );
    Ok(())
}

#[test]
fn test_bad_files_report_context() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("scrobbles-missing.json");
    let err = loader::load_file(&missing).unwrap_err();
    assert!(format!("{:#}", err).contains("scrobbles-missing.json"));

    let broken = dir.path().join("scrobbles-broken.json");
    std::fs::write(&broken, "{not json").unwrap();
    assert!(loader::load_file(&broken).is_err());
    assert!(Report::load_from_file(&broken).is_err());
}
