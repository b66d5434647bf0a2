//! Conversation and suggestion types shared by the generator, router and overlay.

use serde::{Deserialize, Serialize};

/// One extracted chat turn.
///
/// `timestamp` is the extraction time in epoch milliseconds; the page does not
/// expose when the turn was actually sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    pub timestamp: i64,
    pub is_user: bool,
}

impl ChatMessage {
    /// A user turn stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            is_user: true,
        }
    }
}

/// The closed set of suggestion categories. Wire names are `followUp`,
/// `exploration` and `clarification`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionCategory {
    FollowUp,
    Exploration,
    Clarification,
}

/// A proposed next question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub category: SuggestionCategory,
}

/// Outcome of one analysis, as sent over the wire:
/// `{success:true, suggestions}` or `{success:false, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<Suggestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn ok(suggestions: Vec<Suggestion>) -> Self {
        Self {
            success: true,
            suggestions: Some(suggestions),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            suggestions: None,
            error: Some(error.into()),
        }
    }

    /// Split into a `Result` for callers that want to branch on it.
    pub fn into_result(self) -> Result<Vec<Suggestion>, String> {
        if self.success {
            Ok(self.suggestions.unwrap_or_default())
        } else {
            Err(self.error.unwrap_or_else(|| "unknown error".into()))
        }
    }
}
