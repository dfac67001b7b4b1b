use std::net::SocketAddr;

use crate::clients::soundcloud::SoundCloudClient;
use crate::infra::config::{Config, Mode};
use crate::infra::token_source::{self, AccessToken};
use crate::tools::router::SoundCloudSvc;
use crate::tools::search_tracks::SearchTracksTool;

/// Explicit startup acquisition. A failure is logged and leaves the tool
/// in its not-initialized state; the server still comes up.
pub async fn acquire_token(cfg: &Config, flag: Option<&str>) -> Option<AccessToken> {
    match token_source::acquire(flag, &cfg.soundcloud).await {
        Ok(Some((token, origin))) => {
            tracing::info!(origin = ?origin, "SoundCloud access token loaded");
            Some(token)
        }
        Ok(None) => {
            tracing::error!("No SoundCloud access token found. Search functionality will not work.");
            None
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "SoundCloud token acquisition failed");
            None
        }
    }
}

pub fn build_service(cfg: &Config, token: Option<AccessToken>) -> SoundCloudSvc {
    let client = token.map(|t| SoundCloudClient::from_config(&cfg.soundcloud, t));
    SoundCloudSvc::new(SearchTracksTool::new(client))
}

pub async fn run_server(cfg: Config, token_flag: Option<String>) -> anyhow::Result<()> {
    tracing::info!(
        mode = %cfg.mode,
        host = %cfg.host,
        port = cfg.port,
        deprecate_rest = cfg.deprecate_rest,
        "BOOT soundcloud-mcp"
    );

    let token = acquire_token(&cfg, token_flag.as_deref()).await;
    let svc = build_service(&cfg, token);

    if cfg.mode == Mode::Stdio {
        crate::infra::runtime::mcp_transport::serve_stdio(move || (svc, SoundCloudSvc::router()))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let app = if cfg.deprecate_rest {
        crate::infra::http_app::build_app_default(svc)
    } else {
        crate::infra::http_app::build_app_with_rest(svc)
    };

    let listener = tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
