use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "soundcloud-mcp.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Streamable HTTP at `/mcp` (plus `/healthz`).
    Server,
    /// MCP over stdin/stdout only.
    Stdio,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" | "http" | "sse" => Ok(Mode::Server),
            "stdio" => Ok(Mode::Stdio),
            other => Err(format!("Invalid MODE: {other}. Must be 'server' or 'stdio'")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Server => "server",
            Mode::Stdio => "stdio",
        })
    }
}

/// SoundCloud endpoints, credentials and client limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoundCloudConfig {
    pub api_base: String,
    pub token_url: String,
    pub timeout_secs: u64,
    pub token_file: PathBuf,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Default for SoundCloudConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.soundcloud.com".into(),
            token_url: "https://secure.soundcloud.com/oauth/token".into(),
            timeout_secs: 30,
            token_file: PathBuf::from("soundcloud_token.json"),
            client_id: None,
            client_secret: None,
        }
    }
}

impl SoundCloudConfig {
    /// Both halves of the client credentials, when configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub host: String,
    pub port: u16,
    pub deprecate_rest: bool,
    pub soundcloud: SoundCloudConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Stdio,
            host: "127.0.0.1".into(),
            port: 8082,
            deprecate_rest: false,
            soundcloud: SoundCloudConfig::default(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (if any), then environment overrides.
    /// Invalid values fall back silently; use [`Config::validate_env`] to surface them.
    pub fn from_env() -> Self {
        let mut cfg = Self::load_file(&config_path()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable config file");
            Self::default()
        });
        cfg.apply_env();
        cfg
    }

    pub fn from_toml_str(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| format!("invalid config: {e}"))
    }

    fn load_file(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        Self::from_toml_str(&text)
    }

    fn apply_env(&mut self) {
        if let Some(mode) = env("MODE").and_then(|m| m.parse().ok()) {
            self.mode = mode;
        }
        if let Some(host) = env("HOST") {
            self.host = host;
        }
        if let Some(port) = env("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Ok(v) = std::env::var("DEPRECATE_REST") {
            self.deprecate_rest = !v.is_empty();
        }

        let sc = &mut self.soundcloud;
        if let Some(v) = env("SOUNDCLOUD_API_BASE") {
            sc.api_base = v;
        }
        if let Some(v) = env("SOUNDCLOUD_TOKEN_URL") {
            sc.token_url = v;
        }
        if let Some(v) = env("SOUNDCLOUD_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            sc.timeout_secs = v;
        }
        if let Some(v) = env("SOUNDCLOUD_TOKEN_FILE") {
            sc.token_file = PathBuf::from(v);
        }
        if let Some(v) = env("SOUNDCLOUD_CLIENT_ID") {
            sc.client_id = Some(v);
        }
        if let Some(v) = env("SOUNDCLOUD_CLIENT_SECRET") {
            sc.client_secret = Some(v);
        }
    }

    /// Strict check of the raw environment and config file.
    pub fn validate_env() -> Result<Self, String> {
        let cfg = Self::load_file(&config_path())?;
        if let Some(mode) = env("MODE") {
            mode.parse::<Mode>()?;
        }
        if let Some(port) = env("PORT") {
            if port.parse::<u16>().ok() == Some(0) {
                return Err("PORT cannot be 0".into());
            }
        }
        if cfg.port == 0 {
            return Err("PORT cannot be 0".into());
        }
        let mut cfg = cfg;
        cfg.apply_env();
        if cfg.soundcloud.timeout_secs == 0 {
            return Err("SOUNDCLOUD_TIMEOUT_SECS must be positive".into());
        }
        reqwest::Url::parse(&cfg.soundcloud.api_base)
            .map_err(|e| format!("invalid SOUNDCLOUD_API_BASE: {e}"))?;
        reqwest::Url::parse(&cfg.soundcloud.token_url)
            .map_err(|e| format!("invalid SOUNDCLOUD_TOKEN_URL: {e}"))?;
        Ok(cfg)
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn config_path() -> PathBuf {
    env("SOUNDCLOUD_MCP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
