//! SessionManager: lazily created, memoized model session.
//!
//! One manager is built at startup and shared by reference with whatever needs
//! to prompt the model. It holds at most one session; the session lives as long
//! as the manager does.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::errors::ModelError;
use super::host::{LanguageModelHost, ModelSession};
use super::probe;
use super::types::SessionOptions;

pub struct SessionManager {
    host: Arc<dyn LanguageModelHost>,
    session: Mutex<Option<Arc<dyn ModelSession>>>,
}

impl SessionManager {
    pub fn new(host: Arc<dyn LanguageModelHost>) -> Self {
        Self {
            host,
            session: Mutex::new(None),
        }
    }

    /// The host this manager creates sessions on.
    pub fn host(&self) -> &Arc<dyn LanguageModelHost> {
        &self.host
    }

    /// Return the cached session, creating it on first use.
    ///
    /// Returns `None` when the capability is missing or creation fails. A
    /// failed creation is not cached, so the next call starts over.
    pub async fn get_or_create_session(&self) -> Option<Arc<dyn ModelSession>> {
        if !probe::is_available(self.host.as_ref()) {
            tracing::debug!("language model capability not present");
            return None;
        }

        let mut guard = self.session.lock().await;
        if let Some(ref session) = *guard {
            return Some(Arc::clone(session));
        }

        match self.create().await {
            Ok(session) => {
                *guard = Some(Arc::clone(&session));
                Some(session)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create language model session");
                None
            }
        }
    }

    async fn create(&self) -> Result<Arc<dyn ModelSession>, ModelError> {
        let defaults = self.host.defaults().await?;
        let options = SessionOptions::from_defaults(&defaults);
        tracing::info!(
            temperature = options.temperature,
            top_k = ?options.top_k,
            "creating language model session"
        );
        self.host.create_session(options).await
    }
}

/// Forward `text` to `session` and return the raw completion.
pub async fn prompt(session: &dyn ModelSession, text: &str) -> Result<String, ModelError> {
    session.prompt(text).await
}
