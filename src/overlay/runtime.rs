//! Overlay runtime: the event loop that drives one overlay.
//!
//! Inputs arrive on an `OverlayCommand` channel (page mutations, the toolbar
//! toggle forwarded by the router, panel clicks). The loop waits on three
//! things at once:
//! - the next command
//! - the observer's debounce deadline
//! - in-flight analyses, resolved in whatever order they finish
//!
//! Every state change goes through the reducer; the effects it returns are
//! carried out here and the panel is re-rendered afterwards.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::config::OverlaySettings;
use crate::router::{MessageRouter, Request, Response};
use crate::suggestions::AnalysisResult;

use super::observer::ConversationObserver;
use super::page::{extract_transcript, submit_text, ChatPage};
use super::panel::{auto_mode_prompt, click, AutoModeConfirmation, PanelRenderer, PanelView};
use super::state::{Effect, OverlayEvent, OverlayState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCommand {
    /// Something changed inside the chat container.
    ContentChanged,
    ToggleVisibility,
    /// Ask for fresh suggestions without waiting for a page change.
    Refresh,
    SuggestionClicked(usize),
    /// Leave auto mode from the panel.
    DisableAutoMode,
}

type PendingAnalysis = BoxFuture<'static, Option<AnalysisResult>>;

pub struct Overlay {
    page: Arc<dyn ChatPage>,
    router: Arc<MessageRouter>,
    renderer: Arc<dyn PanelRenderer>,
    confirmation: Arc<dyn AutoModeConfirmation>,
    state: OverlayState,
    observer: ConversationObserver,
    in_flight: FuturesUnordered<PendingAnalysis>,
}

impl Overlay {
    pub fn new(
        page: Arc<dyn ChatPage>,
        router: Arc<MessageRouter>,
        renderer: Arc<dyn PanelRenderer>,
        confirmation: Arc<dyn AutoModeConfirmation>,
        settings: &OverlaySettings,
    ) -> Self {
        Self {
            page,
            router,
            renderer,
            confirmation,
            state: OverlayState::from_settings(settings),
            observer: ConversationObserver::new(Duration::from_millis(settings.debounce_ms)),
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Run until every sender of `commands` is dropped.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<OverlayCommand>) {
        if self.state.visible {
            self.observer.attach(Instant::now());
        }
        self.render();
        tracing::info!("overlay started");

        loop {
            let deadline = self.observer.deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                _ = wait_for(deadline) => {
                    if self.observer.take_due(Instant::now()) {
                        self.observe().await;
                    }
                }
                Some(result) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.on_analysis(result).await;
                }
            }
        }

        tracing::info!(abandoned = self.in_flight.len(), "overlay stopped");
    }

    pub async fn handle_command(&mut self, command: OverlayCommand) {
        tracing::debug!(?command, "overlay command");
        match command {
            OverlayCommand::ContentChanged => {
                self.observer.content_changed(Instant::now());
            }
            OverlayCommand::ToggleVisibility => self.apply(OverlayEvent::VisibilityToggled).await,
            OverlayCommand::Refresh => self.apply(OverlayEvent::RefreshRequested).await,
            OverlayCommand::SuggestionClicked(index) => {
                click(self.page.as_ref(), &self.state, index);
            }
            OverlayCommand::DisableAutoMode => self.apply(OverlayEvent::AutoModeExited).await,
        }
    }

    async fn observe(&mut self) {
        let transcript = extract_transcript(self.page.as_ref());
        tracing::debug!(messages = transcript.len(), "transcript extracted");
        self.apply(OverlayEvent::TranscriptExtracted(transcript)).await;
    }

    async fn on_analysis(&mut self, result: Option<AnalysisResult>) {
        let event = match result.map(AnalysisResult::into_result) {
            Some(Ok(suggestions)) => OverlayEvent::SuggestionsReceived(suggestions),
            Some(Err(error)) => {
                tracing::warn!(error = %error, "analysis failed");
                OverlayEvent::AnalysisFailed(error)
            }
            None => OverlayEvent::AnalysisFailed("no response from router".into()),
        };
        self.apply(event).await;
    }

    async fn apply(&mut self, event: OverlayEvent) {
        let mut effects: VecDeque<Effect> = self.state.apply(event).into();

        while let Some(effect) = effects.pop_front() {
            match effect {
                Effect::AttachObserver => self.observer.attach(Instant::now()),
                Effect::DetachObserver => self.observer.detach(),
                Effect::RequestAnalysis(messages) => {
                    tracing::info!(messages = messages.len(), "requesting analysis");
                    let reply = self.router.handle(Request::analyze(messages));
                    self.in_flight.push(
                        async move { reply.resolve().await.and_then(Response::into_analysis) }
                            .boxed(),
                    );
                }
                Effect::PromptAutoMode => {
                    self.render();
                    let confirmation = Arc::clone(&self.confirmation);
                    let message = auto_mode_prompt(self.state.high_confidence_streak);
                    let accepted = confirmation.confirm(&message).await;
                    tracing::info!(accepted, "auto mode prompt answered");
                    let answer = if accepted {
                        OverlayEvent::AutoModeEntered
                    } else {
                        OverlayEvent::AutoModeDeclined
                    };
                    effects.extend(self.state.apply(answer));
                }
                Effect::Submit(text) => {
                    tracing::info!(chars = text.len(), "auto-submitting suggestion");
                    submit_text(self.page.as_ref(), &text);
                }
            }
        }

        self.render();
    }

    fn render(&self) {
        self.renderer.render(&PanelView::from_state(&self.state));
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
