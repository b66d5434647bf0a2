//! Suggestion generation error types.

use thiserror::Error;

use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum SuggestionError {
    /// No model session could be obtained.
    #[error("language model not available")]
    NotAvailable,

    /// The model was reached but the prompt failed.
    #[error("model request failed: {0}")]
    Model(ModelError),

    /// The model's text is not a valid suggestion array.
    #[error("malformed suggestions: {reason}")]
    MalformedResponse { raw_response: String, reason: String },
}

impl From<ModelError> for SuggestionError {
    /// A missing capability reads the same whether it was noticed before or
    /// during the prompt.
    fn from(err: ModelError) -> Self {
        if err.is_unavailable() {
            SuggestionError::NotAvailable
        } else {
            SuggestionError::Model(err)
        }
    }
}
