//! Router error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    /// The inbound text is not a `{command, data?}` envelope.
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    /// A known command carried missing or unusable data.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}
