//! SuggestionGenerator: prompt, submit, parse.
//!
//! Every failure on this path is turned into an `AnalysisResult` value at the
//! `generate` boundary. A malformed reply is final for that cycle.

use std::sync::Arc;

use uuid::Uuid;

use crate::model::{session, SessionManager};

use super::errors::SuggestionError;
use super::parser::parse_suggestions;
use super::prompt::{build_prompt, DEFAULT_MAX_PROMPT_MESSAGES};
use super::types::{AnalysisResult, ChatMessage, Suggestion};

pub struct SuggestionGenerator {
    sessions: Arc<SessionManager>,
    max_messages: usize,
}

impl SuggestionGenerator {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            max_messages: DEFAULT_MAX_PROMPT_MESSAGES,
        }
    }

    /// Override how many recent messages go into the prompt.
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages.max(1);
        self
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Generate suggestions for `messages`. Never panics, never errors.
    pub async fn generate(&self, messages: &[ChatMessage]) -> AnalysisResult {
        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, messages = messages.len(), "generating suggestions");

        match self.try_generate(messages).await {
            Ok(suggestions) => {
                tracing::info!(%request_id, count = suggestions.len(), "suggestions generated");
                AnalysisResult::ok(suggestions)
            }
            Err(e) => {
                match &e {
                    SuggestionError::MalformedResponse { raw_response, reason } => {
                        tracing::warn!(%request_id, %reason, raw = %raw_response, "model returned malformed suggestions");
                    }
                    other => tracing::warn!(%request_id, error = %other, "suggestion generation failed"),
                }
                AnalysisResult::failed(e.to_string())
            }
        }
    }

    async fn try_generate(&self, messages: &[ChatMessage]) -> Result<Vec<Suggestion>, SuggestionError> {
        let session = self
            .sessions
            .get_or_create_session()
            .await
            .ok_or(SuggestionError::NotAvailable)?;

        let prompt = build_prompt(messages, self.max_messages);
        let raw = session::prompt(session.as_ref(), &prompt).await?;
        parse_suggestions(&raw)
    }
}
