//! Wire protocol for the message router.
//!
//! Requests are `{command, data?}` envelopes; responses are plain JSON
//! objects whose shape depends on the command.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Capabilities;
use crate::suggestions::{AnalysisResult, ChatMessage};

use super::errors::RouterError;

pub const ANALYZE_CONVERSATION: &str = "analyze_conversation";
pub const CHECK_CAPABILITIES: &str = "check_capabilities";
pub const TOGGLE_VISIBILITY: &str = "toggle_visibility";

// ─── Requests ────────────────────────────────────────────────────────────────

/// Raw inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Opaque correlation id, echoed by the stdio transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn parse(raw: &str) -> Result<Self, RouterError> {
        serde_json::from_str(raw).map_err(|e| RouterError::MalformedEnvelope {
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeData {
    #[serde(default)]
    messages: Option<Vec<ChatMessage>>,
}

/// A recognised command with its decoded data.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `messages` is `None` when the caller sent no list at all.
    AnalyzeConversation { messages: Option<Vec<ChatMessage>> },
    CheckCapabilities,
    ToggleVisibility,
}

impl Request {
    /// Decode an envelope. Unknown commands decode to `Ok(None)`.
    pub fn from_envelope(envelope: &Envelope) -> Result<Option<Self>, RouterError> {
        let request = match envelope.command.as_str() {
            ANALYZE_CONVERSATION => {
                let messages = match envelope.data {
                    None | Some(Value::Null) => None,
                    Some(ref data) => {
                        serde_json::from_value::<AnalyzeData>(data.clone())
                            .map_err(|e| RouterError::InvalidRequest {
                                reason: format!("bad analyze_conversation data: {e}"),
                            })?
                            .messages
                    }
                };
                Request::AnalyzeConversation { messages }
            }
            CHECK_CAPABILITIES => Request::CheckCapabilities,
            TOGGLE_VISIBILITY => Request::ToggleVisibility,
            _ => return Ok(None),
        };
        Ok(Some(request))
    }

    pub fn analyze(messages: Vec<ChatMessage>) -> Self {
        Request::AnalyzeConversation {
            messages: Some(messages),
        }
    }
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// `{success, suggestions?, error?}`
    Analysis(AnalysisResult),
    /// `{capabilities:{isLanguageModelAvailable}}`
    Capabilities { capabilities: Capabilities },
    /// `{success:true}`
    Ack { success: bool },
}

impl Response {
    pub fn ack() -> Self {
        Response::Ack { success: true }
    }

    /// The analysis payload, if this is an analysis response.
    pub fn into_analysis(self) -> Option<AnalysisResult> {
        match self {
            Response::Analysis(result) => Some(result),
            _ => None,
        }
    }
}

/// How a request is answered.
pub enum Reply {
    /// Answered synchronously.
    Immediate(Response),
    /// Answer is forthcoming; the caller must keep the channel open.
    Deferred(BoxFuture<'static, Response>),
    /// No answer will ever be sent.
    NoResponse,
}

impl Reply {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Reply::Deferred(_))
    }

    /// Wait for the answer, if there is one.
    pub async fn resolve(self) -> Option<Response> {
        match self {
            Reply::Immediate(response) => Some(response),
            Reply::Deferred(future) => Some(future.await),
            Reply::NoResponse => None,
        }
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Immediate(r) => f.debug_tuple("Immediate").field(r).finish(),
            Reply::Deferred(_) => f.write_str("Deferred(..)"),
            Reply::NoResponse => f.write_str("NoResponse"),
        }
    }
}
