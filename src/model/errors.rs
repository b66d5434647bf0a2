//! Model error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility; these types carry the context needed to build
//! meaningful log entries.

use thiserror::Error;

/// Errors that can occur while creating or prompting a model session.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The host does not expose a generative-text capability.
    #[error("language model capability is not available")]
    Unavailable,

    /// The host refused or failed to create a session.
    #[error("session creation failed: {reason}")]
    SessionCreation { reason: String },

    /// TCP/HTTP connection to the model endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// Non-2xx HTTP response from the model endpoint.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The prompt was accepted but the completion could not be produced.
    #[error("prompt failed: {reason}")]
    PromptFailed { reason: String },
}

impl ModelError {
    /// Whether the failure means the capability itself is missing, as opposed
    /// to a single request going wrong.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ModelError::Unavailable | ModelError::SessionCreation { .. }
        )
    }
}
