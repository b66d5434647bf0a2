//! Overlay state and its reducer.
//!
//! Everything the overlay remembers between events lives in [`OverlayState`].
//! It only changes through [`OverlayState::apply`], which takes a named event
//! and returns the side effects the runtime must perform. No I/O happens here.

use crate::config::OverlaySettings;
use crate::suggestions::{ChatMessage, Suggestion};

use super::observer::{has_changed, transcript_key};

/// Minimum user turns before an analysis is requested.
pub const DEFAULT_MIN_USER_MESSAGES: usize = 3;

// ─── Auto mode ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoMode {
    #[default]
    Manual,
    /// The user has been asked whether to enter auto mode.
    AwaitingConfirmation,
    Auto,
}

impl AutoMode {
    pub fn label(self) -> &'static str {
        match self {
            AutoMode::Manual => "manual",
            AutoMode::AwaitingConfirmation => "awaiting confirmation",
            AutoMode::Auto => "auto",
        }
    }
}

/// Confidence gate for entering and staying in auto mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoModePolicy {
    /// A batch is "high" when its best confidence is strictly above this.
    pub threshold: f64,
    /// Consecutive high batches needed before the user is asked.
    pub arm_streak: u32,
}

impl Default for AutoModePolicy {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            arm_streak: 2,
        }
    }
}

/// First suggestion holding the maximum confidence.
pub fn best_suggestion(batch: &[Suggestion]) -> Option<&Suggestion> {
    batch.iter().fold(None, |best, s| match best {
        Some(b) if b.confidence >= s.confidence => Some(b),
        _ => Some(s),
    })
}

// ─── Events and effects ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    VisibilityToggled,
    /// A debounced extraction produced this transcript.
    TranscriptExtracted(Vec<ChatMessage>),
    /// The user asked for fresh suggestions for the current transcript.
    RefreshRequested,
    SuggestionsReceived(Vec<Suggestion>),
    AnalysisFailed(String),
    /// The user accepted the auto-mode prompt.
    AutoModeEntered,
    /// The user declined the auto-mode prompt.
    AutoModeDeclined,
    /// The user switched auto mode off from the panel.
    AutoModeExited,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AttachObserver,
    DetachObserver,
    RequestAnalysis(Vec<ChatMessage>),
    PromptAutoMode,
    /// Write the text into the page input and submit it.
    Submit(String),
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OverlayState {
    pub visible: bool,
    pub transcript: Vec<ChatMessage>,
    pub last_key: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub error: Option<String>,
    pub auto_mode: AutoMode,
    pub high_confidence_streak: u32,
    pub last_confidence: Option<f64>,
    in_flight: usize,
    pending_auto_submit: Option<String>,
    min_user_messages: usize,
    policy: AutoModePolicy,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_USER_MESSAGES, AutoModePolicy::default())
    }
}

impl OverlayState {
    /// A visible overlay with nothing observed yet.
    pub fn new(min_user_messages: usize, policy: AutoModePolicy) -> Self {
        Self {
            visible: true,
            transcript: Vec::new(),
            last_key: None,
            suggestions: Vec::new(),
            error: None,
            auto_mode: AutoMode::Manual,
            high_confidence_streak: 0,
            last_confidence: None,
            in_flight: 0,
            pending_auto_submit: None,
            min_user_messages,
            policy,
        }
    }

    pub fn from_settings(settings: &OverlaySettings) -> Self {
        Self::new(
            settings.min_user_messages,
            AutoModePolicy {
                threshold: settings.auto_threshold,
                arm_streak: settings.auto_arm_streak,
            },
        )
    }

    /// Whether any analysis is still outstanding.
    pub fn is_analyzing(&self) -> bool {
        self.in_flight > 0
    }

    pub fn apply(&mut self, event: OverlayEvent) -> Vec<Effect> {
        match event {
            OverlayEvent::VisibilityToggled => {
                self.visible = !self.visible;
                if self.visible {
                    vec![Effect::AttachObserver]
                } else {
                    vec![Effect::DetachObserver]
                }
            }
            OverlayEvent::TranscriptExtracted(messages) => {
                let key = transcript_key(&messages);
                if !has_changed(self.last_key.as_deref(), &key) {
                    return Vec::new();
                }
                self.transcript = messages;
                self.last_key = Some(key);
                self.request_analysis()
            }
            OverlayEvent::RefreshRequested => self.request_analysis(),
            OverlayEvent::SuggestionsReceived(batch) => self.receive(batch),
            OverlayEvent::AnalysisFailed(error) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.error = Some(error);
                Vec::new()
            }
            OverlayEvent::AutoModeEntered => {
                if self.auto_mode != AutoMode::AwaitingConfirmation {
                    return Vec::new();
                }
                self.auto_mode = AutoMode::Auto;
                self.pending_auto_submit
                    .take()
                    .map(Effect::Submit)
                    .into_iter()
                    .collect()
            }
            OverlayEvent::AutoModeDeclined => {
                if self.auto_mode == AutoMode::AwaitingConfirmation {
                    self.auto_mode = AutoMode::Manual;
                }
                self.pending_auto_submit = None;
                Vec::new()
            }
            OverlayEvent::AutoModeExited => {
                self.auto_mode = AutoMode::Manual;
                self.high_confidence_streak = 0;
                self.pending_auto_submit = None;
                Vec::new()
            }
        }
    }

    fn request_analysis(&mut self) -> Vec<Effect> {
        let user_turns = self.transcript.iter().filter(|m| m.is_user).count();
        if user_turns < self.min_user_messages {
            self.suggestions.clear();
            return Vec::new();
        }
        self.in_flight += 1;
        vec![Effect::RequestAnalysis(self.transcript.clone())]
    }

    fn receive(&mut self, batch: Vec<Suggestion>) -> Vec<Effect> {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.error = None;

        let best = best_suggestion(&batch).cloned();
        let confidence = best.as_ref().map_or(0.0, |s| s.confidence);
        let high = confidence > self.policy.threshold;
        self.last_confidence = Some(confidence);
        self.suggestions = batch;

        let mut effects = Vec::new();

        if high {
            self.high_confidence_streak += 1;
        } else {
            self.high_confidence_streak = 0;
        }

        match self.auto_mode {
            AutoMode::Manual if high && self.high_confidence_streak >= self.policy.arm_streak => {
                self.auto_mode = AutoMode::AwaitingConfirmation;
                self.pending_auto_submit = best.map(|s| s.text);
                effects.push(Effect::PromptAutoMode);
            }
            AutoMode::AwaitingConfirmation => {
                self.pending_auto_submit = if high { best.map(|s| s.text) } else { None };
            }
            AutoMode::Auto => match best {
                Some(s) if high => effects.push(Effect::Submit(s.text)),
                _ => {
                    tracing::info!(confidence, "confidence dropped, leaving auto mode");
                    self.auto_mode = AutoMode::Manual;
                }
            },
            AutoMode::Manual => {}
        }

        effects
    }
}
