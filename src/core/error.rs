use thiserror::Error;

/// Gateway-wide error model. Every failure is reported once, as a value
/// carrying a stable kind and a human-readable message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// No access token is available.
    #[error("{0}")]
    Config(String),
    /// Client-credentials exchange or refresh failed.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    /// Non-2xx from the search endpoint.
    #[error("HTTP error: {status}{}", fmt_detail(.message))]
    Provider { status: u16, message: String },
    #[error("Request timed out")]
    Timeout,
    /// Any other transport or decoding fault.
    #[error("{0}")]
    Transport(String),
    /// Tool arguments rejected before any upstream call.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

fn fmt_detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(" - {message}")
    }
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Config(_) => "ConfigError",
            GatewayError::TokenExchange(_) => "TokenExchangeError",
            GatewayError::Provider { .. } => "ProviderError",
            GatewayError::Timeout => "Timeout",
            GatewayError::Transport(_) => "TransportError",
            GatewayError::InvalidArguments(_) => "InvalidArguments",
        }
    }

    /// Classify a reqwest failure that never produced an HTTP status.
    pub fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(error_chain(e))
        }
    }
}

/// `Display` of `e` followed by each `source()`, joined with `": "`.
pub fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut msg = e.to_string();
    let mut cur = e.source();
    while let Some(cause) = cur {
        let text = cause.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        cur = cause.source();
    }
    msg
}

impl From<anyhow::Error> for GatewayError {
    fn from(e: anyhow::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}
