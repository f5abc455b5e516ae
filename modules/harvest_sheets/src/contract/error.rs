//! Contract error types for the harvest sheets client
//!
//! These errors are transport-agnostic. Their display text is the message
//! surfaced to users, so it is kept short and actionable.

use std::time::Duration;

/// Default message when the proxy rejects a call without saying why
pub const UNKNOWN_API_ERROR: &str = "Unknown API error";

/// Harvest sheets errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetsError {
    /// A required setting is blank (configuration error)
    #[error("{setting} is not set")]
    NotConfigured {
        /// Human readable name of the missing setting
        setting: &'static str,
    },
    /// A required call argument is blank (input error)
    #[error("Missing {argument}")]
    MissingArgument {
        /// Name of the missing argument
        argument: &'static str,
    },
    /// The proxy answered with `ok: false`
    #[error("{message}")]
    Server {
        /// Message reported by the proxy, verbatim
        message: String,
    },
    /// The round trip did not finish in time
    #[error("{action} timed out after {}s", .after.as_secs_f32())]
    Timeout {
        /// Remote action name
        action: String,
        /// Timeout that elapsed
        after: Duration,
    },
    /// Network failure
    #[error("{0}")]
    Transport(String),
    /// The proxy answered with something that is not an envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Local persistence failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SheetsError {
    /// Build a server error, falling back to the generic message when blank
    pub fn server(message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(UNKNOWN_API_ERROR);
        Self::Server {
            message: message.to_string(),
        }
    }

    /// Whether the failure happened before any request was sent
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured { .. } | Self::MissingArgument { .. }
        )
    }
}
