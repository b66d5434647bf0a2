//! Suggestion Panel: what the user sees and clicks.
//!
//! The panel is a view model ([`PanelView`]) derived from [`OverlayState`],
//! handed to a [`PanelRenderer`] after every state change. Clicks write the
//! suggestion into the page and submit it, whatever the auto-mode state.

use async_trait::async_trait;
use serde::Serialize;

use crate::suggestions::Suggestion;

use super::page::{submit_text, ChatPage};
use super::state::{AutoMode, OverlayState};

/// Renderable snapshot of the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub visible: bool,
    pub suggestions: Vec<Suggestion>,
    /// Best confidence of the last batch as a whole percentage.
    pub confidence_percent: Option<u8>,
    pub auto_mode: &'static str,
    pub analyzing: bool,
    pub error: Option<String>,
}

impl PanelView {
    pub fn from_state(state: &OverlayState) -> Self {
        Self {
            visible: state.visible,
            suggestions: state.suggestions.clone(),
            confidence_percent: state.last_confidence.map(confidence_percent),
            auto_mode: state.auto_mode.label(),
            analyzing: state.is_analyzing(),
            error: state.error.clone(),
        }
    }
}

/// `0.874` → `87`.
pub fn confidence_percent(confidence: f64) -> u8 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub trait PanelRenderer: Send + Sync {
    fn render(&self, view: &PanelView);
}

/// Renderer for headless runs: logs each view at debug level.
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl PanelRenderer for TracingRenderer {
    fn render(&self, view: &PanelView) {
        tracing::debug!(
            visible = view.visible,
            suggestions = view.suggestions.len(),
            confidence = ?view.confidence_percent,
            auto_mode = view.auto_mode,
            analyzing = view.analyzing,
            error = ?view.error,
            "panel updated"
        );
    }
}

/// Blocking yes/no question shown before auto mode is entered.
#[async_trait]
pub trait AutoModeConfirmation: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Always declines. Auto mode can never be entered.
#[derive(Debug, Default)]
pub struct NeverConfirm;

#[async_trait]
impl AutoModeConfirmation for NeverConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        false
    }
}

pub fn auto_mode_prompt(streak: u32) -> String {
    format!(
        "The last {streak} suggestion batches were highly confident. \
         Submit the top suggestion automatically from now on?"
    )
}

/// Handle a click on the suggestion at `index`.
///
/// Returns `false` when there is no such suggestion or the page has no input.
pub fn click(page: &dyn ChatPage, state: &OverlayState, index: usize) -> bool {
    match state.suggestions.get(index) {
        Some(suggestion) => submit_text(page, &suggestion.text),
        None => {
            tracing::debug!(index, "click on missing suggestion");
            false
        }
    }
}
