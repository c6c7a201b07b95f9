use thiserror::Error;

/// Top-level error type for the `tasksync-api` crate.
///
/// Covers every failure mode across the gateway: HTTP transport, the REST
/// surface, and the WebSocket push channel. `tasksync-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── REST surface ────────────────────────────────────────────────
    /// Non-success HTTP status from the service. The message carries the
    /// status text (e.g. `"Internal Server Error"`).
    #[error("Request failed: {message}")]
    Api { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Push channel ────────────────────────────────────────────────
    /// WebSocket handshake or connection failed.
    #[error("Push channel connection failed: {0}")]
    ChannelConnect(String),

    /// Transport-level error on an established WebSocket.
    #[error("Push channel error: {0}")]
    Channel(String),
}

impl Error {
    /// The HTTP status code behind this error, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::ChannelConnect(_) | Self::Channel(_) => true,
            _ => false,
        }
    }
}
