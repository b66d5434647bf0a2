//! Model: the generative-text capability and its single session.
//!
//! - `host`: the `LanguageModelHost` / `ModelSession` seams
//! - `probe`: synchronous capability check
//! - `session`: lazily created, memoized session owned by a `SessionManager`
//! - `http`: OpenAI-compatible endpoint implementation of the host
//!
//! Nothing here is a process global: the `SessionManager` is built once at
//! startup and handed to whoever needs it.

pub mod errors;
pub mod host;
pub mod http;
pub mod probe;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::ModelError;
pub use host::{LanguageModelHost, ModelSession};
pub use http::HttpModelHost;
pub use session::SessionManager;
pub use types::{Capabilities, HostCapabilities, ModelDefaults, SessionOptions};
