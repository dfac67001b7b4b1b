use axum::{
    routing::{any_service, get, post},
    Router,
};
use std::sync::Arc;

use crate::infra::runtime::mcp_transport::{make_streamable_http_service, LocalSessionManager};
use crate::tools::registry::build_registry;
use crate::tools::router::SoundCloudSvc;

fn mcp_factory(svc: SoundCloudSvc) -> impl Fn() -> (SoundCloudSvc, crate::tools::router::SoundCloudRouter) + Clone + Send + Sync + 'static {
    move || (svc.clone(), SoundCloudSvc::router())
}

/// `/healthz` + streamable MCP at `/mcp`.
pub fn build_app_default(svc: SoundCloudSvc) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = make_streamable_http_service(mcp_factory(svc), session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}

/// Default app **plus** the plain JSON-RPC endpoint at `/v1/rpc`.
pub fn build_app_with_rest(svc: SoundCloudSvc) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let registry = build_registry(svc.search.clone());
    let mcp_service = make_streamable_http_service(mcp_factory(svc), session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
        .route("/v1/rpc", post(crate::api::rpc::http))
        .with_state(registry)
}
