//! Where the access token comes from. Read once at startup; never refreshed
//! per call.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::clients::oauth::TokenProvider;
use crate::core::error::GatewayError;
use crate::infra::config::SoundCloudConfig;

pub const TOKEN_ENV: &str = "SOUNDCLOUD_ACCESS_TOKEN";

/// Opaque bearer credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Blank input is not a token.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrigin {
    Flag,
    Env,
    File,
    ClientCredentials,
}

#[derive(Deserialize)]
struct TokenFile {
    access_token: Option<String>,
    token: Option<String>,
}

/// Read `{"access_token": ...}` or `{"token": ...}` from a flat JSON file.
/// Missing or malformed files yield `None`.
pub fn read_token_file(path: &Path) -> Option<AccessToken> {
    let text = std::fs::read_to_string(path).ok()?;
    let parsed: TokenFile = match serde_json::from_str(&text) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "token file is not valid JSON");
            return None;
        }
    };
    parsed
        .access_token
        .and_then(AccessToken::new)
        .or_else(|| parsed.token.and_then(AccessToken::new))
}

pub fn write_token_file(path: &Path, token: &AccessToken) -> std::io::Result<()> {
    let body = serde_json::json!({ "access_token": token.as_str() });
    std::fs::write(path, serde_json::to_vec_pretty(&body)?)
}

/// Flag, then environment, then token file. No network.
pub fn resolve_local(flag: Option<&str>, token_file: &Path) -> Option<(AccessToken, TokenOrigin)> {
    if let Some(t) = flag.and_then(AccessToken::new) {
        return Some((t, TokenOrigin::Flag));
    }
    if let Some(t) = std::env::var(TOKEN_ENV).ok().and_then(AccessToken::new) {
        return Some((t, TokenOrigin::Env));
    }
    read_token_file(token_file).map(|t| (t, TokenOrigin::File))
}

/// Startup acquisition: local sources first, then one client-credentials
/// exchange when credentials are configured. `Ok(None)` means nothing is
/// configured at all.
pub async fn acquire(
    flag: Option<&str>,
    cfg: &SoundCloudConfig,
) -> Result<Option<(AccessToken, TokenOrigin)>, GatewayError> {
    if let Some(found) = resolve_local(flag, &cfg.token_file) {
        return Ok(Some(found));
    }
    let Some((id, secret)) = cfg.credentials() else {
        return Ok(None);
    };
    let provider = TokenProvider::from_config(cfg);
    let token = provider.exchange_client_credentials(id, secret).await?;
    Ok(Some((token, TokenOrigin::ClientCredentials)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn blank_tokens_are_rejected() {
        assert!(AccessToken::new("   ").is_none());
        assert_eq!(AccessToken::new(" abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn debug_is_redacted() {
        let t = AccessToken::new("super-secret").unwrap();
        assert!(!format!("{t:?}").contains("super-secret"));
    }

    #[test]
    fn reads_access_token_or_token_field() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        std::fs::write(&a, r#"{"access_token":"tok-a"}"#).unwrap();
        assert_eq!(read_token_file(&a).unwrap().as_str(), "tok-a");

        let b = dir.path().join("b.json");
        std::fs::write(&b, r#"{"token":"tok-b"}"#).unwrap();
        assert_eq!(read_token_file(&b).unwrap().as_str(), "tok-b");

        let c = dir.path().join("c.json");
        std::fs::write(&c, "not json").unwrap();
        assert!(read_token_file(&c).is_none());

        assert!(read_token_file(&dir.path().join("missing.json")).is_none());
    }

    #[test]
    fn write_then_read_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        write_token_file(&path, &AccessToken::new("xyz").unwrap()).unwrap();
        assert_eq!(read_token_file(&path).unwrap().as_str(), "xyz");
    }

    #[test]
    #[serial]
    fn flag_beats_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        std::fs::write(&path, r#"{"access_token":"from-file"}"#).unwrap();

        std::env::set_var(TOKEN_ENV, "from-env");
        let (t, origin) = resolve_local(Some("from-flag"), &path).unwrap();
        assert_eq!((t.as_str(), origin), ("from-flag", TokenOrigin::Flag));

        let (t, origin) = resolve_local(None, &path).unwrap();
        assert_eq!((t.as_str(), origin), ("from-env", TokenOrigin::Env));

        std::env::remove_var(TOKEN_ENV);
        let (t, origin) = resolve_local(None, &path).unwrap();
        assert_eq!((t.as_str(), origin), ("from-file", TokenOrigin::File));

        assert!(resolve_local(None, &dir.path().join("none.json")).is_none());
    }

    #[tokio::test]
    #[serial]
    async fn acquire_falls_back_to_client_credentials() {
        std::env::remove_var(TOKEN_ENV);
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(json!({"access_token": "minted"}));
        });
        let dir = tempfile::tempdir().unwrap();
        let cfg = SoundCloudConfig {
            token_url: server.url("/oauth/token"),
            token_file: dir.path().join("none.json"),
            client_id: Some("id".into()),
            client_secret: Some("secret".into()),
            ..SoundCloudConfig::default()
        };
        let (t, origin) = acquire(None, &cfg).await.unwrap().unwrap();
        m.assert();
        assert_eq!(t.as_str(), "minted");
        assert_eq!(origin, TokenOrigin::ClientCredentials);
    }

    #[tokio::test]
    #[serial]
    async fn acquire_without_any_source_is_none() {
        std::env::remove_var(TOKEN_ENV);
        let dir = tempfile::tempdir().unwrap();
        let cfg = SoundCloudConfig {
            token_file: dir.path().join("none.json"),
            ..SoundCloudConfig::default()
        };
        assert!(acquire(None, &cfg).await.unwrap().is_none());
    }
}
