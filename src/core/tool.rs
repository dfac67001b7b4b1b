use async_trait::async_trait;

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> serde_json::Value;
}

/// Tool = Spec + invocation. Calls never fail at this level: a tool reports
/// its own failures inside the returned JSON (`{"error": ...}`).
#[async_trait]
pub trait Tool: ToolSpec + Send + Sync {
    async fn call(&self, arguments: &serde_json::Value) -> serde_json::Value;
}
