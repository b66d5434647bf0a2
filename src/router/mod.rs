//! Message Router: dispatches inbound command envelopes.
//!
//! The router is the one mailbox through which the overlay (and any external
//! caller such as the stdio transport) asks for analyses, capability checks
//! and visibility toggles. Replies are immediate, deferred, or absent.

pub mod dispatch;
pub mod errors;
pub mod protocol;
pub mod stdio;

pub use dispatch::MessageRouter;
pub use errors::RouterError;
pub use protocol::{Envelope, Reply, Request, Response};
