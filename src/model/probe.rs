//! Capability probe.

use super::host::LanguageModelHost;
use super::types::Capabilities;

/// True iff the host exposes the generative-text namespace *and* a language
/// model inside it. Absence is `false`, never an error.
pub fn is_available(host: &dyn LanguageModelHost) -> bool {
    let caps = host.capabilities();
    caps.ai_namespace && caps.language_model
}

/// The `check_capabilities` report for `host`.
pub fn capabilities(host: &dyn LanguageModelHost) -> Capabilities {
    Capabilities {
        is_language_model_available: is_available(host),
    }
}
