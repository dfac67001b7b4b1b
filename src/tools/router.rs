use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{Implementation, JsonObject, ServerCapabilities, ServerInfo};

use crate::core::mcp::{INSTRUCTIONS, SERVER_NAME};
use crate::core::tool::Tool;
use crate::infra::runtime::mcp_transport::ServerHandler;
use crate::tools::search_tracks::{self, SearchTracksTool};

#[derive(Clone)]
pub struct SoundCloudSvc {
    pub search: SearchTracksTool,
}

impl ServerHandler for SoundCloudSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::default()
            },
            ..ServerInfo::default()
        }
    }
}

#[rmcp::tool_router]
impl SoundCloudSvc {
    #[rmcp::tool(name = "search_tracks", description = "Search for tracks on SoundCloud.")]
    async fn search_tracks(
        &self,
        params: Parameters<JsonObject>,
    ) -> Result<rmcp::Json<serde_json::Value>, rmcp::ErrorData> {
        tracing::debug!(params = ?params.0, "search_tracks invoked");
        // Failures are reported in-band as {"error": ...}, never as protocol errors.
        let out = self.search.call(&serde_json::Value::Object(params.0)).await;
        Ok(rmcp::Json(out))
    }
}

pub type SoundCloudRouter = ToolRouter<SoundCloudSvc>;

impl SoundCloudSvc {
    pub fn new(search: SearchTracksTool) -> Self {
        Self { search }
    }

    /// Macro-generated router with the explicit `search_tracks` input schema.
    pub fn router() -> SoundCloudRouter {
        let mut router = Self::tool_router();
        if let Some(route) = router.map.get_mut(search_tracks::NAME) {
            if let serde_json::Value::Object(schema) = search_tracks::input_schema() {
                route.attr.input_schema = Arc::new(schema);
            }
        }
        router
    }
}
