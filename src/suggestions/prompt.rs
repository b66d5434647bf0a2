//! Prompt construction for follow-up suggestions.

use super::types::ChatMessage;

/// Number of suggestions the model is asked for.
pub const SUGGESTION_COUNT: usize = 3;

/// Default cap on the number of recent messages embedded in a prompt.
pub const DEFAULT_MAX_PROMPT_MESSAGES: usize = 10;

/// The trailing `max` messages of `messages`.
pub fn recent(messages: &[ChatMessage], max: usize) -> &[ChatMessage] {
    let start = messages.len().saturating_sub(max);
    &messages[start..]
}

/// Build the suggestion prompt from the last `max_messages` turns.
///
/// Only user turns are embedded. Older turns beyond the window are dropped
/// without notice.
pub fn build_prompt(messages: &[ChatMessage], max_messages: usize) -> String {
    let transcript = recent(messages, max_messages)
        .iter()
        .filter(|m| m.is_user)
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on this conversation, suggest {SUGGESTION_COUNT} relevant follow-up questions \
that would help the user explore the topic further.\n\
\n\
Conversation:\n\
{transcript}\n\
\n\
Respond with a JSON array of exactly {SUGGESTION_COUNT} objects. Each object must have:\n\
- \"text\": the question\n\
- \"confidence\": a number between 0 and 1\n\
- \"category\": one of \"followUp\", \"exploration\", \"clarification\"\n\
\n\
Respond with the JSON array only, no other text."
    )
}
