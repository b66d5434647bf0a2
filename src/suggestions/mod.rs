//! Suggestions: turning recent chat turns into follow-up questions.
//!
//! Submodules:
//! - `prompt`: prompt text from the most recent user turns
//! - `parser`: strict JSON parsing of the model's reply
//! - `generator`: prompt → session → parse, with failures as values
//! - `types`: `ChatMessage`, `Suggestion`, `AnalysisResult`

pub mod errors;
pub mod generator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use errors::SuggestionError;
pub use generator::SuggestionGenerator;
pub use types::{AnalysisResult, ChatMessage, Suggestion, SuggestionCategory};
