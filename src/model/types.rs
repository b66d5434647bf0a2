//! Shared types for model hosts and sessions.

use serde::{Deserialize, Serialize};

/// Temperature used for every suggestion session.
pub const SESSION_TEMPERATURE: f32 = 0.8;

/// System instruction installed on every suggestion session.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that helps users with their questions.";

/// What the host environment exposes. Both flags must be set for the
/// capability to count as present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostCapabilities {
    /// The generative-text namespace exists at all.
    pub ai_namespace: bool,
    /// The namespace offers a language-model sub-capability.
    pub language_model: bool,
}

/// Sampling defaults reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefaults {
    #[serde(default)]
    pub default_temperature: Option<f32>,
    #[serde(default)]
    pub default_top_k: Option<u32>,
}

/// Parameters a session is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub temperature: f32,
    /// Omitted when the host reports no default.
    pub top_k: Option<u32>,
    pub system_prompt: String,
}

impl SessionOptions {
    /// Fixed temperature and system instruction, top-K taken from the host.
    pub fn from_defaults(defaults: &ModelDefaults) -> Self {
        Self {
            temperature: SESSION_TEMPERATURE,
            top_k: defaults.default_top_k,
            system_prompt: SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

/// Capability report returned by `check_capabilities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub is_language_model_available: bool,
}
