//! Scripted host used by unit tests across the crate.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::errors::ModelError;
use super::host::{LanguageModelHost, ModelSession};
use super::types::{HostCapabilities, ModelDefaults, SessionOptions};

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<String, ModelError>>,
    delays: VecDeque<Duration>,
    prompts: Vec<String>,
    last_options: Option<SessionOptions>,
    creation_attempts: u32,
    sessions_created: u32,
    failing_creations: u32,
}

/// A host whose sessions answer from a queue of canned replies.
pub struct ScriptedHost {
    available: bool,
    top_k: Option<u32>,
    failing_defaults: bool,
    script: Arc<Mutex<Script>>,
}

impl ScriptedHost {
    pub fn available() -> Self {
        Self {
            available: true,
            top_k: Some(3),
            failing_defaults: false,
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn failing_defaults(mut self) -> Self {
        self.failing_defaults = true;
        self
    }

    pub fn failing_creations(self, count: u32) -> Self {
        self.script.lock().unwrap().failing_creations = count;
        self
    }

    pub fn with_replies<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .lock()
            .unwrap()
            .replies
            .extend(replies.into_iter().map(|r| Ok(r.into())));
        self
    }

    pub fn with_prompt_error(self, error: ModelError) -> Self {
        self.script.lock().unwrap().replies.push_back(Err(error));
        self
    }

    /// Delay the next replies by these amounts, in prompt order.
    pub fn with_reply_delays<I>(self, delays: I) -> Self
    where
        I: IntoIterator<Item = Duration>,
    {
        self.script.lock().unwrap().delays.extend(delays);
        self
    }

    /// Queue another reply after construction.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.script.lock().unwrap().replies.push_back(Ok(reply.into()));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.script.lock().unwrap().prompts.clone()
    }

    pub fn last_options(&self) -> Option<SessionOptions> {
        self.script.lock().unwrap().last_options.clone()
    }

    pub fn creation_attempts(&self) -> u32 {
        self.script.lock().unwrap().creation_attempts
    }

    pub fn sessions_created(&self) -> u32 {
        self.script.lock().unwrap().sessions_created
    }
}

#[async_trait]
impl LanguageModelHost for ScriptedHost {
    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            ai_namespace: self.available,
            language_model: self.available,
        }
    }

    async fn defaults(&self) -> Result<ModelDefaults, ModelError> {
        if self.failing_defaults {
            return Err(ModelError::SessionCreation {
                reason: "defaults unavailable".into(),
            });
        }
        Ok(ModelDefaults {
            default_temperature: Some(1.0),
            default_top_k: self.top_k,
        })
    }

    async fn create_session(
        &self,
        options: SessionOptions,
    ) -> Result<Arc<dyn ModelSession>, ModelError> {
        let mut script = self.script.lock().unwrap();
        script.creation_attempts += 1;
        if script.failing_creations > 0 {
            script.failing_creations -= 1;
            return Err(ModelError::SessionCreation {
                reason: "scripted failure".into(),
            });
        }
        script.sessions_created += 1;
        script.last_options = Some(options);
        Ok(Arc::new(ScriptedSession {
            script: Arc::clone(&self.script),
        }))
    }
}

struct ScriptedSession {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl ModelSession for ScriptedSession {
    async fn prompt(&self, text: &str) -> Result<String, ModelError> {
        let (reply, delay) = {
            let mut script = self.script.lock().unwrap();
            script.prompts.push(text.to_string());
            let reply = script.replies.pop_front().unwrap_or_else(|| {
                Err(ModelError::PromptFailed {
                    reason: "no scripted reply".into(),
                })
            });
            (reply, script.delays.pop_front().unwrap_or_default())
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}
