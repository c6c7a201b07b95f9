// ── Core error types ──
//
// User-facing errors from tasksync-core. Consumers never see raw reqwest
// or tungstenite failures; the `From<tasksync_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input rejected before any network call (e.g. empty task text).
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// The service answered with a non-success status.
    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },

    /// The service could not be reached at all.
    #[error("Cannot reach service: {reason}")]
    Connection { reason: String },

    /// The push channel failed.
    #[error("Push channel failed: {reason}")]
    Channel { reason: String },

    /// Configuration error (bad base URL and the like).
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tasksync_api::Error> for CoreError {
    fn from(err: tasksync_api::Error) -> Self {
        match err {
            tasksync_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            tasksync_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::Connection {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            tasksync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            tasksync_api::Error::ChannelConnect(reason) | tasksync_api::Error::Channel(reason) => {
                CoreError::Channel { reason }
            }
        }
    }
}
