//! SoundCloud search domain: request filters, normalized tracks, and the
//! pure helpers that sit between the tool boundary and the HTTP client.

pub mod format;
pub mod query;

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

pub use format::{format_duration, format_track, format_track_info};
pub use query::{build_search_params, ParamValue, SearchParams};

pub const DEFAULT_LIMIT: u32 = 10;
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inclusive `from`/`to` bounds of a filter dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFilter<T> {
    pub from: T,
    pub to: T,
}

impl<T> RangeFilter<T> {
    pub fn new(from: T, to: T) -> Self {
        Self { from, to }
    }
}

/// Structured track search. `None` means "no filter on this dimension".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub genres: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub bpm: Option<RangeFilter<u32>>,
    /// Seconds.
    pub duration: Option<RangeFilter<u32>>,
    /// `YYYY-MM-DD HH:MM:SS`, passed through verbatim.
    pub created_at: Option<RangeFilter<String>>,
    pub limit: u32,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: None,
            genres: None,
            tags: None,
            bpm: None,
            duration: None,
            created_at: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRequest(pub String);

impl fmt::Display for InvalidRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidRequest {}

impl SearchRequest {
    pub fn query(text: impl Into<String>) -> Self {
        Self { query: Some(text.into()), ..Self::default() }
    }

    /// Boundary checks the provider would otherwise reject.
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.limit == 0 {
            return Err(InvalidRequest("limit must be at least 1".into()));
        }
        if let Some(r) = &self.bpm {
            if r.from > r.to {
                return Err(InvalidRequest(format!("bpm min {} exceeds max {}", r.from, r.to)));
            }
        }
        if let Some(r) = &self.duration {
            if r.from > r.to {
                return Err(InvalidRequest(format!(
                    "duration min {} exceeds max {}",
                    r.from, r.to
                )));
            }
        }
        if let Some(r) = &self.created_at {
            let from = parse_created_at(&r.from)?;
            let to = parse_created_at(&r.to)?;
            if from > to {
                return Err(InvalidRequest(format!(
                    "created_at min {} is after max {}",
                    r.from, r.to
                )));
            }
        }
        Ok(())
    }
}

fn parse_created_at(s: &str) -> Result<NaiveDateTime, InvalidRequest> {
    NaiveDateTime::parse_from_str(s, CREATED_AT_FORMAT).map_err(|_| {
        InvalidRequest(format!("created_at '{s}' is not in YYYY-MM-DD HH:MM:SS form"))
    })
}

/// A track normalized from the provider payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink_url: Option<String>,
}

impl Track {
    /// Multi-line human-readable summary.
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("Title: {}", self.title),
            format!("Artist: {}", self.artist),
            format!("Duration: {}", format_duration(self.duration_ms)),
        ];
        if let Some(genre) = &self.genre {
            parts.push(format!("Genre: {genre}"));
        }
        if let Some(url) = &self.permalink_url {
            parts.push(format!("Link: {url}"));
        }
        parts.join("\n")
    }
}

/// Successful search: normalized tracks plus the decoded provider body.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub tracks: Vec<Track>,
    pub raw: serde_json::Value,
}

impl SearchPage {
    pub fn from_raw(raw: serde_json::Value) -> Self {
        let tracks = collection(&raw).iter().map(format_track).collect();
        Self { tracks, raw }
    }

    /// Elements of the provider's `collection` array, empty when absent.
    pub fn collection(&self) -> &[serde_json::Value] {
        collection(&self.raw)
    }
}

fn collection(raw: &serde_json::Value) -> &[serde_json::Value] {
    raw.get("collection")
        .and_then(|c| c.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
