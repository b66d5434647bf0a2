//! The chat page the overlay sits on.
//!
//! The page's markup is not ours and can change at any moment, so every
//! operation here degrades to a no-op when the element it needs is missing.

use serde::Deserialize;

use crate::suggestions::ChatMessage;

/// Selectors for the three elements the overlay touches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageSelectors {
    /// The conversation container whose subtree is observed.
    #[serde(default = "default_container")]
    pub container: String,
    /// One element per user turn inside the container.
    #[serde(default = "default_user_turn")]
    pub user_turn: String,
    /// The editable prompt input.
    #[serde(default = "default_input")]
    pub input: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            container: default_container(),
            user_turn: default_user_turn(),
            input: default_input(),
        }
    }
}

fn default_container() -> String {
    "main".into()
}
fn default_user_turn() -> String {
    "[data-message-author-role=\"user\"]".into()
}
fn default_input() -> String {
    "#prompt-textarea".into()
}

/// Synchronous view of the page's document tree.
pub trait ChatPage: Send + Sync {
    /// Text of every user turn in the container, in document order.
    /// Empty when the container is missing.
    fn user_turn_texts(&self) -> Vec<String>;

    /// Replace the input's content. `false` when there is no input.
    fn set_input(&self, text: &str) -> bool;

    /// Focus the input. `false` when there is no input.
    fn focus_input(&self) -> bool;

    /// Dispatch the submit keystroke (Enter) on the input.
    fn dispatch_submit(&self) -> bool;
}

/// Read the current user turns as a fresh transcript.
///
/// All messages share one timestamp: the time of extraction.
pub fn extract_transcript(page: &dyn ChatPage) -> Vec<ChatMessage> {
    let timestamp = chrono::Utc::now().timestamp_millis();
    page.user_turn_texts()
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(|text| ChatMessage {
            text,
            timestamp,
            is_user: true,
        })
        .collect()
}

/// Write `text` into the input, focus it and submit.
///
/// Returns `false` (having done nothing) when the input is missing.
pub fn submit_text(page: &dyn ChatPage, text: &str) -> bool {
    if !page.set_input(text) {
        tracing::debug!("chat input not found, skipping submit");
        return false;
    }
    page.focus_input();
    page.dispatch_submit()
}
