//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! matched request (axum)
//!     → context.rs (explicit per-request state)
//!     → dispatcher.rs (auth gate → role gate → action)
//!     → outcome.rs (what the action produced)
//!     → http/response.rs (synthesis and emission)
//! ```
//!
//! # Design Decisions
//! - One context per request, owned by that request's task; nothing shared
//! - Gates short-circuit to synthesized 401/403 before the action runs
//! - Action results are a sum type; no mutate-a-flag completion signaling

pub mod context;
pub mod dispatcher;
pub mod outcome;

pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use outcome::{HandlerOutcome, ResponseDescriptor};
