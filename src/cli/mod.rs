use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::clients::oauth::TokenProvider;
use crate::clients::soundcloud::SoundCloudClient;
use crate::domain::{format_track_info, SearchRequest, DEFAULT_LIMIT};
use crate::infra::config::{Config, Mode};
use crate::infra::token_source::{self, write_token_file};

#[derive(Parser)]
#[command(name = "soundcloud-mcp")]
#[command(about = "SoundCloud track search over the Model Context Protocol")]
#[command(version)]
pub struct Cli {
    /// SoundCloud access token (otherwise SOUNDCLOUD_ACCESS_TOKEN or the token file)
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// Transport: stdio or server (streamable HTTP)
    #[arg(long)]
    pub mode: Option<Mode>,
    /// Bind host for server mode
    #[arg(long)]
    pub host: Option<String>,
    /// Bind port for server mode
    #[arg(long)]
    pub port: Option<u16>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Health check a running server
    Health {
        #[arg(short, long, default_value = "http://localhost:8082")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// Obtain an access token and write it to the token file
    Token {
        /// Use the refresh-token grant instead of client credentials
        #[arg(long)]
        refresh: Option<String>,
        /// Output file (defaults to the configured token file)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Run one track search and print the formatted results
    Search {
        query: String,
        #[arg(long = "genre")]
        genres: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },
}

impl Cli {
    /// Environment/TOML config with command-line overrides on top.
    pub fn config(&self) -> Config {
        let mut cfg = Config::from_env();
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(host) = &self.host {
            cfg.host = host.clone();
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        cfg
    }
}

pub async fn run(cli: Cli) -> ExitCode {
    let cfg = cli.config();
    match cli.command {
        None => match crate::infra::boot::run_server(cfg, cli.token).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "server exited with error");
                ExitCode::FAILURE
            }
        },
        Some(command) => run_commands(command, &cfg, cli.token.as_deref()).await,
    }
}

pub async fn run_commands(command: Commands, cfg: &Config, token: Option<&str>) -> ExitCode {
    match command {
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match Config::validate_env() {
            Ok(cfg) => {
                println!("✅ Configuration is valid");
                println!("  Mode: {}", cfg.mode);
                println!("  Bind: {}:{}", cfg.host, cfg.port);
                println!("  API base: {}", cfg.soundcloud.api_base);
                println!("  Token file: {}", cfg.soundcloud.token_file.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Token { refresh, out } => {
            let out = out.unwrap_or_else(|| cfg.soundcloud.token_file.clone());
            match mint_token(cfg, refresh.as_deref(), &out).await {
                Ok(()) => {
                    println!("✅ Token written to {}", out.display());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("❌ Token request failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Search { query, genres, tags, limit } => {
            let request = SearchRequest {
                query: Some(query),
                genres: (!genres.is_empty()).then_some(genres),
                tags: (!tags.is_empty()).then_some(tags),
                limit,
                ..SearchRequest::default()
            };
            match search(cfg, token, &request).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("❌ Search failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url.trim_end_matches('/')))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

async fn mint_token(
    cfg: &Config,
    refresh: Option<&str>,
    out: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (id, secret) = cfg
        .soundcloud
        .credentials()
        .ok_or("SOUNDCLOUD_CLIENT_ID and SOUNDCLOUD_CLIENT_SECRET must be set")?;
    let provider = TokenProvider::from_config(&cfg.soundcloud);
    let token = match refresh {
        Some(r) => provider.refresh(r, id, secret).await?,
        None => provider.exchange_client_credentials(id, secret).await?,
    };
    write_token_file(out, &token)?;
    Ok(())
}

async fn search(
    cfg: &Config,
    token: Option<&str>,
    request: &SearchRequest,
) -> Result<usize, Box<dyn std::error::Error>> {
    request.validate()?;
    let (token, _) = token_source::resolve_local(token, &cfg.soundcloud.token_file)
        .ok_or("No SoundCloud access token found")?;
    let client = SoundCloudClient::from_config(&cfg.soundcloud, token);
    let page = client.search_tracks(request).await?;

    println!("🔍 Found {} tracks", page.tracks.len());
    for (i, raw) in page.collection().iter().enumerate() {
        println!("\n{}.\n{}", i + 1, format_track_info(raw));
    }
    Ok(page.tracks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::SoundCloudConfig;
    use crate::infra::token_source::{read_token_file, TOKEN_ENV};
    use httpmock::prelude::*;
    use serde_json::json;
    use serial_test::serial;
    use std::env;

    fn config_for(server: &MockServer, dir: &std::path::Path) -> Config {
        Config {
            soundcloud: SoundCloudConfig {
                api_base: server.base_url(),
                token_url: server.url("/oauth/token"),
                token_file: dir.join("soundcloud_token.json"),
                client_id: Some("id".into()),
                client_secret: Some("secret".into()),
                ..SoundCloudConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn cli_parses_global_token_and_subcommand() {
        let cli = Cli::parse_from(["soundcloud-mcp", "--token", "t", "search", "Techno", "--genre", "House", "-l", "3"]);
        assert_eq!(cli.token.as_deref(), Some("t"));
        match cli.command {
            Some(Commands::Search { query, genres, limit, .. }) => {
                assert_eq!(query, "Techno");
                assert_eq!(genres, vec!["House".to_string()]);
                assert_eq!(limit, 3);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn cli_parses_mode_override() {
        let cli = Cli::parse_from(["soundcloud-mcp", "--mode", "server", "--port", "9000"]);
        assert_eq!(cli.mode, Some(Mode::Server));
        assert_eq!(cli.port, Some(9000));
        assert!(cli.command.is_none());
    }

    #[tokio::test]
    async fn health_check_ok_and_error_paths() {
        let server = MockServer::start();
        server.mock(|when, then| { when.method(GET).path("/healthz"); then.status(200).body("ok"); });
        assert!(health_check(&server.base_url()).await.is_ok());

        let bad = MockServer::start();
        bad.mock(|when, then| { when.method(GET).path("/healthz"); then.status(500); });
        assert!(health_check(&bad.base_url()).await.is_err());

        assert!(health_check("http://localhost:9").await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn run_commands_config_success_and_failure() {
        env::set_var("SOUNDCLOUD_MCP_CONFIG", "/nonexistent/soundcloud-mcp.toml");
        env::remove_var("PORT");
        env::set_var("MODE", "server");
        let cfg = Config::default();
        let code = run_commands(Commands::Config { validate: true }, &cfg, None).await;
        assert_eq!(code, ExitCode::SUCCESS);

        env::set_var("MODE", "nope");
        let code = run_commands(Commands::Config { validate: true }, &cfg, None).await;
        assert_eq!(code, ExitCode::FAILURE);
        env::remove_var("MODE");
        env::remove_var("SOUNDCLOUD_MCP_CONFIG");
    }

    #[tokio::test]
    async fn token_command_writes_token_file() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/oauth/token")
                .body("grant_type=client_credentials");
            then.status(200).json_body(json!({"access_token": "minted"}));
        });
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_for(&server, dir.path());

        let code = run_commands(Commands::Token { refresh: None, out: None }, &cfg, None).await;
        assert_eq!(code, ExitCode::SUCCESS);
        m.assert();
        let t = read_token_file(&cfg.soundcloud.token_file).unwrap();
        assert_eq!(t.as_str(), "minted");
    }

    #[tokio::test]
    async fn token_command_requires_credentials() {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_for(&server, dir.path());
        cfg.soundcloud.client_secret = None;
        let code = run_commands(Commands::Token { refresh: Some("r".into()), out: None }, &cfg, None).await;
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn search_command_uses_flag_token() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/tracks")
                .header("authorization", "Bearer flag-token")
                .query_param("q", "Techno")
                .query_param("genres", "House");
            then.status(200).json_body(json!({"collection": [{"title": "A"}, {"title": "B"}]}));
        });
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_for(&server, dir.path());
        let req = SearchRequest {
            query: Some("Techno".into()),
            genres: Some(vec!["House".into()]),
            ..SearchRequest::default()
        };
        let n = search(&cfg, Some("flag-token"), &req).await.unwrap();
        m.assert();
        assert_eq!(n, 2);
    }

    #[tokio::test]
    #[serial]
    async fn search_command_without_token_fails() {
        env::remove_var(TOKEN_ENV);
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_for(&server, dir.path());
        let code = run_commands(
            Commands::Search { query: "x".into(), genres: vec![], tags: vec![], limit: 10 },
            &cfg,
            None,
        )
        .await;
        assert_eq!(code, ExitCode::FAILURE);
    }
}
