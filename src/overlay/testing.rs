//! In-memory page, renderer and confirmation for overlay tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::page::ChatPage;
use super::panel::{AutoModeConfirmation, PanelRenderer, PanelView};

pub(crate) struct MemoryPage {
    turns: Mutex<Option<Vec<String>>>,
    has_input: bool,
    input: Mutex<String>,
    focused: AtomicBool,
    submitted: Mutex<Vec<String>>,
}

impl MemoryPage {
    pub(crate) fn with_turns<I, S>(turns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            turns: Mutex::new(Some(turns.into_iter().map(Into::into).collect())),
            has_input: true,
            input: Mutex::new(String::new()),
            focused: AtomicBool::new(false),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn without_container() -> Self {
        let page = Self::with_turns(Vec::<String>::new());
        *page.turns.lock().unwrap() = None;
        page
    }

    pub(crate) fn without_input(mut self) -> Self {
        self.has_input = false;
        self
    }

    pub(crate) fn push_turn(&self, text: &str) {
        if let Some(turns) = self.turns.lock().unwrap().as_mut() {
            turns.push(text.to_string());
        }
    }

    pub(crate) fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn was_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }
}

impl ChatPage for MemoryPage {
    fn user_turn_texts(&self) -> Vec<String> {
        self.turns.lock().unwrap().clone().unwrap_or_default()
    }

    fn set_input(&self, text: &str) -> bool {
        if !self.has_input {
            return false;
        }
        *self.input.lock().unwrap() = text.to_string();
        true
    }

    fn focus_input(&self) -> bool {
        self.focused.store(self.has_input, Ordering::SeqCst);
        self.has_input
    }

    fn dispatch_submit(&self) -> bool {
        if !self.has_input {
            return false;
        }
        let text = std::mem::take(&mut *self.input.lock().unwrap());
        self.submitted.lock().unwrap().push(text);
        true
    }
}

#[derive(Default)]
pub(crate) struct RecordingRenderer {
    views: Mutex<Vec<PanelView>>,
}

impl RecordingRenderer {
    pub(crate) fn last(&self) -> Option<PanelView> {
        self.views.lock().unwrap().last().cloned()
    }
}

impl PanelRenderer for RecordingRenderer {
    fn render(&self, view: &PanelView) {
        self.views.lock().unwrap().push(view.clone());
    }
}

pub(crate) struct ScriptedConfirmation {
    answer: bool,
    asked: AtomicUsize,
}

impl ScriptedConfirmation {
    pub(crate) fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
        }
    }

    pub(crate) fn times_asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AutoModeConfirmation for ScriptedConfirmation {
    async fn confirm(&self, _message: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}
