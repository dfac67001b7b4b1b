use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::core::error::{error_chain, GatewayError};
use crate::infra::config::SoundCloudConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client;
use crate::infra::token_source::AccessToken;

pub const ACCEPT_JSON: &str = "application/json; charset=utf-8";

/// OAuth2 token endpoint client. One POST per call, no retries.
#[derive(Clone)]
pub struct TokenProvider {
    token_url: String,
    http: Client,
}

#[derive(Deserialize)]
struct TokenWire {
    access_token: Option<String>,
}

impl TokenProvider {
    pub fn new(token_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
            http: make_http_client(Duration::from_secs(30)),
        }
    }

    pub fn from_config(cfg: &SoundCloudConfig) -> Self {
        Self {
            token_url: cfg.token_url.clone(),
            http: make_http_client(Duration::from_secs(cfg.timeout_secs)),
        }
    }

    /// Server-to-server flow: Basic `base64(id:secret)` plus
    /// `grant_type=client_credentials`.
    pub async fn exchange_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken, GatewayError> {
        let builder = self
            .http
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")]);
        self.send(builder, "client_credentials").await
    }

    /// Trade a refresh token for a fresh access token. Credentials travel in
    /// the form body.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken, GatewayError> {
        let builder = self.http.post(&self.token_url).form(&[
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ]);
        self.send(builder, "refresh_token").await
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        grant: &'static str,
    ) -> Result<AccessToken, GatewayError> {
        let (builder, rid) = add_standard_headers(builder.header(reqwest::header::ACCEPT, ACCEPT_JSON), None);
        tracing::debug!(endpoint = %self.token_url, grant = grant, request_id = %rid, "token request");

        let resp = builder
            .send()
            .await
            .map_err(|e| GatewayError::TokenExchange(error_chain(&e)))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), grant = grant, "token endpoint rejected request");
            return Err(GatewayError::TokenExchange(format!(
                "upstream status {status}: {}",
                body.trim()
            )));
        }
        let wire: TokenWire = resp
            .json()
            .await
            .map_err(|e| {
                GatewayError::TokenExchange(format!("invalid token response: {}", error_chain(&e)))
            })?;
        let token = wire
            .access_token
            .and_then(AccessToken::new)
            .ok_or_else(|| GatewayError::TokenExchange("missing access_token in response".into()))?;
        tracing::info!(grant = grant, "obtained SoundCloud access token");
        Ok(token)
    }
}
