//! Normalization of raw SoundCloud track objects.

use serde_json::Value;

use super::Track;

const UNKNOWN: &str = "Unknown";

/// Milliseconds as `m:ss`.
pub fn format_duration(milliseconds: u64) -> String {
    let seconds = milliseconds / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Map a raw track object onto [`Track`], defaulting every missing field.
pub fn format_track(raw: &Value) -> Track {
    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_owned();
    let artist = raw
        .get("user")
        .and_then(|u| u.get("username"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_owned();
    let duration_ms = raw.get("duration").and_then(Value::as_u64).unwrap_or(0);
    let genre = raw
        .get("genre")
        .and_then(Value::as_str)
        .filter(|g| !g.is_empty())
        .map(str::to_owned);
    let permalink_url = raw
        .get("permalink_url")
        .and_then(Value::as_str)
        .map(str::to_owned);

    Track { title, artist, duration_ms, genre, permalink_url }
}

/// Human-readable summary of one `collection` element.
pub fn format_track_info(raw: &Value) -> String {
    if !raw.is_object() {
        return "Invalid track data".to_owned();
    }
    format_track(raw).summary()
}
