pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // Logs go to stderr: in stdio mode stdout carries protocol frames.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Record a counter increment and mirror it as a structured log line.
pub fn count(metric: &'static str, kind: &'static str) {
    metrics::counter!(metric, "kind" => kind).increment(1);
    tracing::info!(metric = metric, kind = kind, value = 1.0, "metric");
}

/// Record a latency sample and mirror it as a structured log line.
pub fn log_metric(tool: &str, metric: &'static str, value: f64) {
    metrics::histogram!(metric, "tool" => tool.to_owned()).record(value);
    tracing::info!(tool = tool, metric = metric, value = value, "metric");
}
