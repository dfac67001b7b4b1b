//! Plain JSON-RPC endpoint (`/v1/rpc`) over the tool registry, for clients
//! that do not speak Streamable HTTP.

use axum::Json;
use serde_json::{json, Value as J};

use crate::core::mcp::{InitializeResult, RpcReq, RpcResp};
use crate::infra::http::json::{self as http_json, APPLICATION_ERROR, METHOD_NOT_FOUND};
use crate::tools::registry::ToolRegistry;

fn tools_list(reg: &ToolRegistry) -> J {
    let tools: Vec<J> = reg
        .list()
        .into_iter()
        .map(|t| json!({ "name": t.name, "description": t.description, "inputSchema": t.input_schema }))
        .collect();
    json!({ "tools": tools })
}

async fn call_tool(reg: &ToolRegistry, params: &J) -> Result<J, String> {
    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or("missing tool name")?;
    let args = params.get("arguments").unwrap_or(&J::Null);
    reg.call(name, args).await
}

pub async fn http(
    axum::extract::State(reg): axum::extract::State<ToolRegistry>,
    Json(req): Json<RpcReq>,
) -> Json<RpcResp> {
    tracing::debug!(method = %req.method, id = ?req.id, "rpc handler invoked");
    let id = req.id.clone();
    let resp = match req.method.as_str() {
        "initialize" => {
            let init = serde_json::to_value(InitializeResult::current()).unwrap_or(J::Null);
            http_json::ok(id, init).0
        }
        "shutdown" => http_json::ok(id, J::Null).0,
        "tools.list" | "tools/list" => http_json::ok(id, tools_list(&reg)).0,
        "tools.call" | "tools/call" => match call_tool(&reg, &req.params).await {
            Ok(out) => http_json::ok(id, out).0,
            Err(e) => {
                tracing::warn!(error = %e, "tools/call rejected");
                http_json::error(id, APPLICATION_ERROR, e).0
            }
        },
        _ => http_json::error(id, METHOD_NOT_FOUND, format!("unknown method: {}", req.method)).0,
    };
    Json(resp)
}
