/// Listening history loader.
///
/// Reads the JSON exports of the upstream scrobbling service and normalizes
/// them into [`Event`]s. Several export shapes exist:
/// - a plain array of track objects
/// - an array of pages, each an array of track objects
/// - `{"recenttracks": {"track": [...]}}` as returned by the API
/// - `{"track": [...]}`
///
/// A single track object may stand in for the array in the last two shapes.
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::event::Event;

const FILE_PREFIX: &str = "scrobbles-";
const FILE_SUFFIX: &str = ".json";

/// Text that is either a plain string or an object carrying `#text` or `name`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    Plain(String),
    Object {
        #[serde(rename = "#text", default)]
        text: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl TextField {
    /// `#text` wins over `name` when an object carries both.
    fn into_text(self) -> String {
        match self {
            TextField::Plain(text) => text,
            TextField::Object { text, name } => text.or(name).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Epoch {
    Text(String),
    Number(i64),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDate {
    uts: Option<Epoch>,
    #[serde(rename = "#text")]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTrack {
    artist: Option<TextField>,
    album: Option<TextField>,
    name: Option<String>,
    url: Option<String>,
    image: Value,
    date: Option<RawDate>,
}

impl RawTrack {
    fn into_event(self) -> Event {
        let date = self.date.unwrap_or_default();
        Event {
            artist: self.artist.map(TextField::into_text).unwrap_or_default(),
            album: self.album.map(TextField::into_text).unwrap_or_default(),
            track: self.name.unwrap_or_default(),
            timestamp_utc: date.text.unwrap_or_default(),
            raw_epoch: match date.uts {
                Some(Epoch::Text(text)) => text,
                Some(Epoch::Number(n)) => n.to_string(),
                None => String::new(),
            },
            media_urls: media_urls(&self.image),
            permalink: self.url.unwrap_or_default(),
        }
    }
}

/// Artwork URLs by size label; anything but an array of objects yields nothing.
fn media_urls(images: &Value) -> IndexMap<String, String> {
    let mut urls = IndexMap::new();
    let Some(images) = images.as_array() else {
        return urls;
    };
    for image in images.iter().filter_map(Value::as_object) {
        let size = image
            .get("size")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let url = image.get("#text").and_then(Value::as_str).unwrap_or("");
        urls.insert(size.to_string(), url.to_string());
    }
    urls
}

fn track_objects(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(items) if matches!(items.first(), Some(Value::Array(_))) => items
            .iter()
            .filter_map(Value::as_array)
            .flatten()
            .collect(),
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => {
            let tracks = match map.get("recenttracks").filter(|v| v.is_object()) {
                Some(recent) => recent.get("track"),
                None => map.get("track"),
            };
            match tracks {
                Some(Value::Array(items)) => items.iter().collect(),
                Some(single) => vec![single],
                None => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Normalize an already-parsed export into events, in file order.
pub fn parse_events(data: &Value) -> Vec<Event> {
    let mut events = Vec::new();
    let mut skipped = 0usize;

    for item in track_objects(data) {
        if !item.is_object() {
            skipped += 1;
            continue;
        }
        match RawTrack::deserialize(item) {
            Ok(raw) => events.push(raw.into_event()),
            Err(e) => {
                tracing::debug!("Skipping malformed track entry: {}", e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped entries that are not track objects");
    }
    events
}

/// Load and normalize an export file.
pub fn load_file(path: &Path) -> Result<Vec<Event>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scrobbles file: {}", path.display()))?;

    let data: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from: {}", path.display()))?;

    let events = parse_events(&data);
    tracing::info!(
        file = %path.display(),
        events = events.len(),
        "Loaded scrobbles"
    );
    Ok(events)
}

/// Export files (`scrobbles-*.json`) in a directory, sorted by path.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read data directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list data directory: {}", dir.display()))?
            .path();
        let is_export = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX));
        if is_export && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
