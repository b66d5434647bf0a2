//! OpenAI-compatible model host.
//!
//! Backs the generative-text capability with a chat-completions endpoint
//! (Ollama, llama.cpp, vLLM, ...). Each session is a system prompt plus
//! sampling parameters; every `prompt` is a single non-streaming request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::config::ModelSettings;

use super::errors::ModelError;
use super::host::{LanguageModelHost, ModelSession};
use super::types::{HostCapabilities, ModelDefaults, SessionOptions};

// ─── Wire Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Request body for `POST {base_url}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ─── HttpModelHost ───────────────────────────────────────────────────────────

/// Host backed by an HTTP chat-completions endpoint.
///
/// Only a connect timeout is set: a slow completion keeps the caller waiting.
pub struct HttpModelHost {
    http: HttpClient,
    settings: ModelSettings,
}

impl HttpModelHost {
    pub fn new(settings: ModelSettings) -> Result<Self, ModelError> {
        let http = HttpClient::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .map_err(|e| ModelError::ConnectionFailed {
                endpoint: settings.base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { http, settings })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModelHost for HttpModelHost {
    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            ai_namespace: !self.settings.base_url.trim().is_empty(),
            language_model: !self.settings.model_name.trim().is_empty(),
        }
    }

    async fn defaults(&self) -> Result<ModelDefaults, ModelError> {
        // Chat-completions endpoints do not publish sampling defaults; the
        // configured values stand in for them.
        Ok(ModelDefaults {
            default_temperature: None,
            default_top_k: self.settings.top_k,
        })
    }

    async fn create_session(
        &self,
        options: SessionOptions,
    ) -> Result<Arc<dyn ModelSession>, ModelError> {
        if !self.capabilities().language_model {
            return Err(ModelError::Unavailable);
        }
        Ok(Arc::new(HttpSession {
            http: self.http.clone(),
            url: self.completions_url(),
            model: self.settings.model_name.clone(),
            api_key: self.settings.api_key.clone(),
            options,
        }))
    }
}

struct HttpSession {
    http: HttpClient,
    url: String,
    model: String,
    api_key: Option<String>,
    options: SessionOptions,
}

impl HttpSession {
    fn build_request<'a>(&'a self, text: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &self.options.system_prompt,
                },
                WireMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.options.temperature,
            top_k: self.options.top_k,
            stream: false,
        }
    }
}

#[async_trait]
impl ModelSession for HttpSession {
    async fn prompt(&self, text: &str) -> Result<String, ModelError> {
        let mut request = self.http.post(&self.url).json(&self.build_request(text));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| ModelError::ConnectionFailed {
            endpoint: self.url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatCompletionResponse =
            response.json().await.map_err(|e| ModelError::PromptFailed {
                reason: format!("unreadable completion body: {e}"),
            })?;

        extract_content(body)
    }
}

fn extract_content(body: ChatCompletionResponse) -> Result<String, ModelError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ModelError::PromptFailed {
            reason: "completion had no content".into(),
        })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
