//! Overlay: the companion panel living on top of the chat page.
//!
//! Submodules:
//! - `page`: the `ChatPage` contract and transcript extraction
//! - `html`: `ChatPage` over HTML snapshots, located by `PageSelectors`
//! - `observer`: trailing debounce and transcript keys
//! - `state`: overlay state and its reducer, including auto mode
//! - `panel`: view model, click handling, auto-mode confirmation
//! - `runtime`: the event loop tying them together

pub mod html;
pub mod observer;
pub mod page;
pub mod panel;
pub mod runtime;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use html::{HtmlPage, PageError};
pub use page::{ChatPage, PageSelectors};
pub use panel::{AutoModeConfirmation, PanelRenderer, PanelView};
pub use runtime::{Overlay, OverlayCommand};
pub use state::{AutoMode, AutoModePolicy, Effect, OverlayEvent, OverlayState};
