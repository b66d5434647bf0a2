//! `HtmlPage`: a `ChatPage` over HTML snapshots of the chat page.
//!
//! A browser-side bridge pushes the page's markup with [`HtmlPage::load`]
//! whenever it changes and drains what the overlay typed with
//! [`HtmlPage::take_submissions`]. The three elements are located with the
//! configured [`PageSelectors`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use scraper::{Html, Selector};
use thiserror::Error;

use super::page::{ChatPage, PageSelectors};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid {role} selector {selector:?}: {reason}")]
    InvalidSelector {
        role: &'static str,
        selector: String,
        reason: String,
    },
}

pub struct HtmlPage {
    container: Selector,
    user_turn: Selector,
    input: Selector,
    document: Mutex<String>,
    draft: Mutex<String>,
    focused: AtomicBool,
    submitted: Mutex<Vec<String>>,
}

impl HtmlPage {
    /// Compile `selectors`. The page starts out empty.
    pub fn new(selectors: &PageSelectors) -> Result<Self, PageError> {
        Ok(Self {
            container: compile("container", &selectors.container)?,
            user_turn: compile("user turn", &selectors.user_turn)?,
            input: compile("input", &selectors.input)?,
            document: Mutex::new(String::new()),
            draft: Mutex::new(String::new()),
            focused: AtomicBool::new(false),
            submitted: Mutex::new(Vec::new()),
        })
    }

    /// Replace the snapshot with the page's current markup.
    pub fn load(&self, html: impl Into<String>) {
        *lock(&self.document) = html.into();
    }

    /// Texts submitted since the last call, oldest first.
    pub fn take_submissions(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.submitted))
    }

    pub fn is_input_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    fn has_input(&self) -> bool {
        let html = Html::parse_document(&lock(&self.document));
        let found = html.select(&self.input).next().is_some();
        if !found {
            tracing::debug!("no element matches the input selector");
        }
        found
    }
}

impl ChatPage for HtmlPage {
    fn user_turn_texts(&self) -> Vec<String> {
        let html = Html::parse_document(&lock(&self.document));
        let Some(container) = html.select(&self.container).next() else {
            tracing::debug!("chat container not found");
            return Vec::new();
        };
        container
            .select(&self.user_turn)
            .map(|turn| turn.text().collect::<String>())
            .collect()
    }

    fn set_input(&self, text: &str) -> bool {
        if !self.has_input() {
            return false;
        }
        *lock(&self.draft) = text.to_string();
        true
    }

    fn focus_input(&self) -> bool {
        let found = self.has_input();
        self.focused.store(found, Ordering::SeqCst);
        found
    }

    fn dispatch_submit(&self) -> bool {
        if !self.has_input() {
            return false;
        }
        let text = std::mem::take(&mut *lock(&self.draft));
        if text.is_empty() {
            return false;
        }
        lock(&self.submitted).push(text);
        true
    }
}

fn compile(role: &'static str, selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|e| PageError::InvalidSelector {
        role,
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
