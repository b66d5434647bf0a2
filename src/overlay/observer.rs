//! Conversation observer: trailing debounce plus transcript keys.
//!
//! The page reports opaque "content changed" signals, many per visible
//! update. They are collapsed into a single extraction that runs once the
//! quiet window has passed since the *last* signal. Everything here is a pure
//! function of its inputs and the `now` it is given.

use std::time::Duration;

use tokio::time::Instant;

use crate::suggestions::ChatMessage;

/// Quiet window after the last mutation before extracting.
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(2_000);

/// Stable comparison key for a transcript.
///
/// Covers text and authorship in order; extraction timestamps are left out so
/// that re-reading an unchanged page yields the same key.
pub fn transcript_key(messages: &[ChatMessage]) -> String {
    let pairs: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| serde_json::json!([m.text, m.is_user]))
        .collect();
    serde_json::Value::Array(pairs).to_string()
}

/// Whether `next` differs from the previously observed key.
pub fn has_changed(previous: Option<&str>, next: &str) -> bool {
    previous != Some(next)
}

// ─── Debouncer ───────────────────────────────────────────────────────────────

/// Trailing-edge debouncer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Record a signal at `now`; pushes the deadline out.
    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `true` exactly once per burst, when `now` has reached the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

// ─── ConversationObserver ────────────────────────────────────────────────────

/// Debounced observer that only listens while attached.
#[derive(Debug, Clone)]
pub struct ConversationObserver {
    debouncer: Debouncer,
    attached: bool,
}

impl ConversationObserver {
    pub fn new(quiet: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(quiet),
            attached: false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Start listening. Schedules one check so that anything that changed
    /// while detached is picked up.
    pub fn attach(&mut self, now: Instant) {
        self.attached = true;
        self.debouncer.signal(now);
    }

    /// Stop listening and drop any pending check.
    pub fn detach(&mut self) {
        self.attached = false;
        self.debouncer.cancel();
    }

    /// A mutation in the container subtree. Ignored while detached.
    pub fn content_changed(&mut self, now: Instant) {
        if self.attached {
            self.debouncer.signal(now);
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        if self.attached {
            self.debouncer.deadline()
        } else {
            None
        }
    }

    /// Whether an extraction should run now.
    pub fn take_due(&mut self, now: Instant) -> bool {
        self.attached && self.debouncer.fire_if_due(now)
    }
}
