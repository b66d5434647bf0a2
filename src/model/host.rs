//! Host seams: the generative-text capability and the sessions it hands out.

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::ModelError;
use super::types::{HostCapabilities, ModelDefaults, SessionOptions};

/// A generative-text capability provided by the execution environment.
#[async_trait]
pub trait LanguageModelHost: Send + Sync {
    /// Synchronous capability report. Must not fail or perform I/O.
    fn capabilities(&self) -> HostCapabilities;

    /// Sampling defaults reported by the host.
    async fn defaults(&self) -> Result<ModelDefaults, ModelError>;

    /// Create a new session with the given parameters.
    async fn create_session(
        &self,
        options: SessionOptions,
    ) -> Result<Arc<dyn ModelSession>, ModelError>;
}

/// A live session: prompt string in, raw completion text out.
#[async_trait]
pub trait ModelSession: Send + Sync {
    async fn prompt(&self, text: &str) -> Result<String, ModelError>;
}
