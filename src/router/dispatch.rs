//! MessageRouter: the single inbound mailbox.
//!
//! One handler keyed by command string:
//! - `analyze_conversation` → validated synchronously, answered later with the
//!   generator's result
//! - `check_capabilities` → answered later with the probe result
//! - `toggle_visibility` → forwarded to the overlay and acknowledged at once
//!
//! Unknown commands get no answer at all; callers apply their own timeout.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::model::probe;
use crate::overlay::OverlayCommand;
use crate::suggestions::{AnalysisResult, SuggestionGenerator};

use super::protocol::{Envelope, Reply, Request, Response};

pub struct MessageRouter {
    generator: Arc<SuggestionGenerator>,
    overlay: Option<mpsc::UnboundedSender<OverlayCommand>>,
}

impl MessageRouter {
    pub fn new(generator: Arc<SuggestionGenerator>) -> Self {
        Self {
            generator,
            overlay: None,
        }
    }

    /// Route `toggle_visibility` to an overlay's command queue.
    pub fn with_overlay(mut self, overlay: mpsc::UnboundedSender<OverlayCommand>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Decode and dispatch a raw JSON envelope.
    ///
    /// Malformed envelopes are treated like unknown commands: no response.
    pub fn dispatch_json(&self, raw: &str) -> Reply {
        match Envelope::parse(raw) {
            Ok(envelope) => self.dispatch(&envelope),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed message");
                Reply::NoResponse
            }
        }
    }

    pub fn dispatch(&self, envelope: &Envelope) -> Reply {
        match Request::from_envelope(envelope) {
            Ok(Some(request)) => self.handle(request),
            Ok(None) => {
                tracing::debug!(command = %envelope.command, "ignoring unknown command");
                Reply::NoResponse
            }
            Err(e) => {
                tracing::warn!(command = %envelope.command, error = %e, "rejecting request");
                Reply::Immediate(Response::Analysis(AnalysisResult::failed(e.to_string())))
            }
        }
    }

    pub fn handle(&self, request: Request) -> Reply {
        match request {
            Request::AnalyzeConversation { messages } => {
                let messages = match messages {
                    Some(m) if !m.is_empty() => m,
                    _ => {
                        return Reply::Immediate(Response::Analysis(AnalysisResult::failed(
                            "No messages provided",
                        )))
                    }
                };
                let generator = Arc::clone(&self.generator);
                Reply::Deferred(
                    async move { Response::Analysis(generator.generate(&messages).await) }.boxed(),
                )
            }
            Request::CheckCapabilities => {
                let host = Arc::clone(self.generator.sessions().host());
                Reply::Deferred(
                    async move {
                        Response::Capabilities {
                            capabilities: probe::capabilities(host.as_ref()),
                        }
                    }
                    .boxed(),
                )
            }
            Request::ToggleVisibility => {
                match self.overlay {
                    Some(ref tx) => {
                        if tx.send(OverlayCommand::ToggleVisibility).is_err() {
                            tracing::debug!("overlay is gone, toggle dropped");
                        }
                    }
                    None => tracing::debug!("no overlay attached, toggle dropped"),
                }
                Reply::Immediate(Response::ack())
            }
        }
    }
}
