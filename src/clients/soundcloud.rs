use std::time::{Duration, Instant};

use reqwest::Client;

use crate::clients::oauth::ACCEPT_JSON;
use crate::core::error::GatewayError;
use crate::domain::{build_search_params, SearchPage, SearchRequest};
use crate::infra::config::SoundCloudConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::logging::{count, log_metric};
use crate::infra::runtime::limits::make_http_client;
use crate::infra::token_source::AccessToken;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// SoundCloud public API client bound to one access token.
#[derive(Clone)]
pub struct SoundCloudClient {
    base: String,
    http: Client,
    token: AccessToken,
    timeout: Duration,
}

impl SoundCloudClient {
    pub fn new(base: impl Into<String>, token: AccessToken) -> Self {
        Self::with_timeout(base, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base: impl Into<String>, token: AccessToken, timeout: Duration) -> Self {
        Self {
            base: base.into(),
            http: make_http_client(timeout),
            token,
            timeout,
        }
    }

    pub fn from_config(cfg: &SoundCloudConfig, token: AccessToken) -> Self {
        Self::with_timeout(cfg.api_base.clone(), token, Duration::from_secs(cfg.timeout_secs))
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// `GET /tracks`, single attempt.
    pub async fn search_tracks(&self, request: &SearchRequest) -> Result<SearchPage, GatewayError> {
        let url = self.url("tracks");
        let params = build_search_params(request);
        tracing::info!(endpoint = %url, params = ?params, "soundcloud.search_tracks request");

        let start = Instant::now();
        let res = self.get_json(&url, &params).await;
        let elapsed_ms = start.elapsed().as_millis() as f64;
        log_metric("search_tracks", "soundcloud_search_latency_ms", elapsed_ms);
        count("soundcloud_search_total", "all");

        match res {
            Ok(raw) => {
                let page = SearchPage::from_raw(raw);
                tracing::info!(tracks = page.tracks.len(), "soundcloud.search_tracks ok");
                Ok(page)
            }
            Err(e) => {
                count("soundcloud_search_errors_total", e.kind());
                tracing::error!(kind = e.kind(), error = %e, "soundcloud.search_tracks failed");
                Err(e)
            }
        }
    }

    async fn get_json<Q: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
    ) -> Result<serde_json::Value, GatewayError> {
        let builder = self
            .http
            .get(url)
            .bearer_auth(self.token.as_str())
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .timeout(self.timeout)
            .query(query);
        let (builder, _rid) = add_standard_headers(builder, None);

        let resp = builder
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(&e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "soundcloud upstream error");
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                message: body.trim().chars().take(200).collect(),
            });
        }
        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| GatewayError::from_transport(&e))
    }
}
