//! Error types for the account runner.
//!
//! Uses `thiserror` for typed errors that surface through the whole pass:
//! config loading, account files, HTTP transport, and response decoding.

/// Errors that can occur while running account passes.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// A local file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request never produced a usable HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server rejected the account's init data (HTTP 401).
    #[error("unauthorized: init data rejected")]
    Unauthorized,

    /// The server refused the request (HTTP 400).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Local JSON serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A request or an account pass exceeded its deadline.
    #[error("timeout: {0}")]
    Timeout(String),
}

impl RunnerError {
    /// Whether the transport may try the same request again.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }

    /// Whether the error ends the account pass.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
