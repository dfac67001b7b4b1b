//! Flattening of a [`SearchRequest`] into SoundCloud's query-string keys.

use std::fmt;

use serde::Serialize;

use super::SearchRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Int(u32),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_owned())
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Int(n)
    }
}

/// Ordered key/value pairs, ready for `reqwest::RequestBuilder::query`.
pub type SearchParams = Vec<(&'static str, ParamValue)>;

/// Pure: absent filters emit no key; `limit` and `linked_partitioning`
/// are always present.
pub fn build_search_params(request: &SearchRequest) -> SearchParams {
    let mut params: SearchParams = Vec::with_capacity(10);

    if let Some(q) = &request.query {
        params.push(("q", ParamValue::Text(q.clone())));
    }
    if let Some(genres) = request.genres.as_ref().filter(|g| !g.is_empty()) {
        params.push(("genres", ParamValue::Text(genres.join(","))));
    }
    if let Some(tags) = request.tags.as_ref().filter(|t| !t.is_empty()) {
        params.push(("tags", ParamValue::Text(tags.join(","))));
    }
    if let Some(bpm) = &request.bpm {
        params.push(("bpm[from]", bpm.from.into()));
        params.push(("bpm[to]", bpm.to.into()));
    }
    if let Some(duration) = &request.duration {
        params.push(("duration[from]", duration.from.into()));
        params.push(("duration[to]", duration.to.into()));
    }
    if let Some(created_at) = &request.created_at {
        params.push(("created_at[from]", ParamValue::Text(created_at.from.clone())));
        params.push(("created_at[to]", ParamValue::Text(created_at.to.clone())));
    }

    params.push(("limit", request.limit.into()));
    params.push(("linked_partitioning", "1".into()));
    params
}
