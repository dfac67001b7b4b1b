use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::clients::soundcloud::SoundCloudClient;
use crate::core::error::GatewayError;
use crate::core::tool::{Tool, ToolSpec};
use crate::domain::{format_track_info, RangeFilter, SearchRequest, DEFAULT_LIMIT};

pub const NAME: &str = "search_tracks";
pub const NOT_INITIALIZED: &str =
    "SoundCloud client not initialized. Please set SOUNDCLOUD_ACCESS_TOKEN.";

#[derive(Debug, Clone, Deserialize)]
pub struct BpmArg {
    pub min_bpm: u32,
    pub max_bpm: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DurationArg {
    pub min_duration: u32,
    pub max_duration: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedAtArg {
    pub min_created_at: String,
    pub max_created_at: String,
}

/// Wire arguments of `search_tracks`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracksArgs {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub bpm: Option<BpmArg>,
    #[serde(default)]
    pub duration: Option<DurationArg>,
    #[serde(default)]
    pub created_at: Option<CreatedAtArg>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_true")]
    pub format_results: bool,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_true() -> bool {
    true
}

impl SearchTracksArgs {
    /// Decode and validate; `null` is treated as "no arguments".
    pub fn parse(arguments: &Value) -> Result<(SearchRequest, bool), String> {
        let args: SearchTracksArgs = if arguments.is_null() {
            serde_json::from_value(json!({}))
        } else {
            serde_json::from_value(arguments.clone())
        }
        .map_err(|e| e.to_string())?;
        let format_results = args.format_results;
        let request = SearchRequest::from(args);
        request.validate().map_err(|e| e.to_string())?;
        Ok((request, format_results))
    }
}

impl From<SearchTracksArgs> for SearchRequest {
    fn from(a: SearchTracksArgs) -> Self {
        SearchRequest {
            query: a.query,
            genres: a.genres,
            tags: a.tags,
            bpm: a.bpm.map(|b| RangeFilter::new(b.min_bpm, b.max_bpm)),
            duration: a.duration.map(|d| RangeFilter::new(d.min_duration, d.max_duration)),
            created_at: a
                .created_at
                .map(|c| RangeFilter::new(c.min_created_at, c.max_created_at)),
            limit: a.limit,
        }
    }
}

/// `search_tracks` adapter. The client exists only when a token was found
/// at startup.
#[derive(Clone)]
pub struct SearchTracksTool {
    client: Option<SoundCloudClient>,
}

impl SearchTracksTool {
    pub fn new(client: Option<SoundCloudClient>) -> Self {
        Self { client }
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn run(&self, arguments: &Value) -> Value {
        let Some(client) = &self.client else {
            let e = GatewayError::Config(NOT_INITIALIZED.into());
            tracing::error!(kind = e.kind(), "search_tracks called without access token");
            return error_value(&e);
        };

        let (request, format_results) = match SearchTracksArgs::parse(arguments) {
            Ok(parsed) => parsed,
            Err(e) => {
                let e = GatewayError::InvalidArguments(e);
                tracing::warn!(kind = e.kind(), error = %e, "search_tracks rejected arguments");
                return error_value(&e);
            }
        };

        let page = match client.search_tracks(&request).await {
            Ok(page) => page,
            Err(e) => return error_value(&e),
        };

        let collection = page.collection();
        let track_count = collection.len();
        tracing::info!(count = track_count, "Found {track_count} tracks");

        if format_results && track_count > 0 {
            let tracks: Vec<String> = collection.iter().map(format_track_info).collect();
            return json!({
                "count": track_count,
                "tracks": tracks,
                "raw_data": page.raw,
            });
        }

        match page.raw {
            Value::Null => json!({ "error": "No results found" }),
            Value::Object(ref m) if m.is_empty() => json!({ "error": "No results found" }),
            raw => raw,
        }
    }
}

fn error_value(e: &GatewayError) -> Value {
    json!({ "error": e.to_string(), "kind": e.kind() })
}

impl ToolSpec for SearchTracksTool {
    fn name(&self) -> &'static str {
        NAME
    }
    fn description(&self) -> &'static str {
        "Search for tracks on SoundCloud by text, genres, tags, BPM, duration and creation date."
    }
    fn input_schema(&self) -> Value {
        input_schema()
    }
}

#[async_trait]
impl Tool for SearchTracksTool {
    async fn call(&self, arguments: &Value) -> Value {
        self.run(arguments).await
    }
}

pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The name of the track to search for."
            },
            "genres": {
                "type": "array",
                "items": { "type": "string" },
                "description": "The genres to search for (ex: Pop, House)."
            },
            "tags": {
                "type": "array",
                "items": { "type": "string" },
                "description": "The tags to search for."
            },
            "bpm": {
                "type": "object",
                "description": "The BPM range to search for.",
                "properties": {
                    "min_bpm": { "type": "integer", "minimum": 0, "description": "Minimum BPM" },
                    "max_bpm": { "type": "integer", "minimum": 0, "description": "Maximum BPM" }
                },
                "required": ["min_bpm", "max_bpm"]
            },
            "duration": {
                "type": "object",
                "description": "The duration range to search for.",
                "properties": {
                    "min_duration": { "type": "integer", "minimum": 0, "description": "Minimum duration in seconds" },
                    "max_duration": { "type": "integer", "minimum": 0, "description": "Maximum duration in seconds" }
                },
                "required": ["min_duration", "max_duration"]
            },
            "created_at": {
                "type": "object",
                "description": "The date and time range to search for.",
                "properties": {
                    "min_created_at": { "type": "string", "description": "Minimum created date in the format YYYY-MM-DD HH:MM:SS" },
                    "max_created_at": { "type": "string", "description": "Maximum created date in the format YYYY-MM-DD HH:MM:SS" }
                },
                "required": ["min_created_at", "max_created_at"]
            },
            "limit": {
                "type": "integer",
                "minimum": 1,
                "default": 10,
                "description": "Maximum number of results to return"
            },
            "format_results": {
                "type": "boolean",
                "default": true,
                "description": "Whether to format results in a human-readable way"
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::token_source::AccessToken;
    use httpmock::prelude::*;

    fn tool_for(server: &MockServer) -> SearchTracksTool {
        let token = AccessToken::new("tok").unwrap();
        SearchTracksTool::new(Some(SoundCloudClient::new(server.base_url(), token)))
    }

    #[tokio::test]
    async fn no_token_returns_error_without_network() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.any_request();
            then.status(200).json_body(json!({"collection": []}));
        });

        let tool = SearchTracksTool::new(None);
        assert!(!tool.is_ready());
        let out = tool.call(&json!({"query": "x"})).await;
        assert_eq!(out["error"], NOT_INITIALIZED);
        assert_eq!(out["kind"], "ConfigError");
        m.assert_hits(0);
    }

    #[tokio::test]
    async fn formats_two_tracks() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tracks").query_param("q", "Summertime Blues");
            then.status(200).json_body(json!({
                "collection": [
                    {"title": "Summertime Blues", "user": {"username": "eddie"}, "duration": 125000,
                     "genre": "Rock", "permalink_url": "https://soundcloud.com/eddie/sb"},
                    {"title": "Cover", "duration": 59000}
                ],
                "next_href": "https://api.soundcloud.com/tracks?cursor=abc"
            }));
        });

        let out = tool_for(&server).call(&json!({"query": "Summertime Blues"})).await;
        assert_eq!(out["count"], 2);
        let tracks = out["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(
            tracks[0],
            "Title: Summertime Blues\nArtist: eddie\nDuration: 2:05\nGenre: Rock\nLink: https://soundcloud.com/eddie/sb"
        );
        assert_eq!(tracks[1], "Title: Cover\nArtist: Unknown\nDuration: 0:59");
        assert_eq!(out["raw_data"]["collection"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn format_results_false_returns_raw_payload() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tracks");
            then.status(200).json_body(json!({"collection": [{"title": "A"}]}));
        });

        let out = tool_for(&server)
            .call(&json!({"query": "a", "format_results": false}))
            .await;
        assert!(out.get("count").is_none());
        assert_eq!(out["collection"][0]["title"], "A");
    }

    #[tokio::test]
    async fn zero_tracks_returns_raw_payload() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tracks");
            then.status(200).json_body(json!({"collection": [], "next_href": null}));
        });

        let out = tool_for(&server).call(&json!({"query": "nothing"})).await;
        assert!(out["collection"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_object_body_is_no_results() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tracks");
            then.status(200).json_body(json!({}));
        });

        let out = tool_for(&server).call(&Value::Null).await;
        assert_eq!(out["error"], "No results found");
    }

    #[tokio::test]
    async fn provider_failure_becomes_error_value() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tracks");
            then.status(401);
        });

        let out = tool_for(&server).call(&json!({})).await;
        assert!(out["error"].as_str().unwrap().contains("401"));
        assert_eq!(out["kind"], "ProviderError");
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_the_network() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.any_request();
            then.status(200).json_body(json!({"collection": []}));
        });
        let tool = tool_for(&server);

        let out = tool.call(&json!({"bpm": {"min_bpm": 140, "max_bpm": 120}})).await;
        assert!(out["error"].as_str().unwrap().starts_with("Invalid arguments"));
        assert_eq!(out["kind"], "InvalidArguments");

        let out = tool.call(&json!({"genres": "House"})).await;
        assert!(out["error"].as_str().unwrap().starts_with("Invalid arguments"));

        let out = tool.call(&json!({"limit": 0})).await;
        assert!(out["error"].as_str().unwrap().contains("limit"));

        m.assert_hits(0);
    }

    #[tokio::test]
    async fn concurrent_calls_each_get_a_result() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/tracks");
            then.status(200).json_body(json!({
                "collection": [{"title": "A", "user": {"username": "u"}, "duration": 1000}]
            }));
        });

        let tool = tool_for(&server);
        let mut set = tokio::task::JoinSet::new();
        for i in 0..8 {
            let tool = tool.clone();
            set.spawn(async move { tool.call(&json!({"query": format!("q{i}")})).await });
        }
        let mut done = 0;
        while let Some(out) = set.join_next().await {
            let out = out.unwrap();
            assert_eq!(out["count"], 1);
            done += 1;
        }
        assert_eq!(done, 8);
        m.assert_hits(8);
    }

    #[test]
    fn args_map_onto_request() {
        let (req, fmt) = SearchTracksArgs::parse(&json!({
            "query": "Techno",
            "bpm": {"min_bpm": 120, "max_bpm": 140},
            "duration": {"min_duration": 60, "max_duration": 600},
            "created_at": {"min_created_at": "2020-01-01 00:00:00", "max_created_at": "2021-01-01 00:00:00"}
        }))
        .unwrap();
        assert!(fmt);
        assert_eq!(req.limit, 10);
        assert_eq!(req.bpm, Some(RangeFilter::new(120, 140)));
        assert_eq!(req.duration, Some(RangeFilter::new(60, 600)));
        assert_eq!(req.created_at.unwrap().to, "2021-01-01 00:00:00");
    }

    #[test]
    fn schema_declares_all_fields() {
        let schema = input_schema();
        let props = schema["properties"].as_object().unwrap();
        for key in ["query", "genres", "tags", "bpm", "duration", "created_at", "limit", "format_results"] {
            assert!(props.contains_key(key), "missing {key}");
        }
        assert_eq!(props["limit"]["default"], 10);
        assert_eq!(props["format_results"]["default"], true);
    }
}
