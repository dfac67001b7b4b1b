use axum::Json;

use crate::core::mcp::{err as rpc_err, ok as rpc_ok, RpcResp};

pub const METHOD_NOT_FOUND: i32 = -32601;
pub const APPLICATION_ERROR: i32 = -32000;

pub fn ok(id: serde_json::Value, result: serde_json::Value) -> Json<RpcResp> {
    Json(rpc_ok(id, result))
}

pub fn error(id: serde_json::Value, code: i32, message: impl Into<String>) -> Json<RpcResp> {
    Json(rpc_err(id, code, message, None))
}
