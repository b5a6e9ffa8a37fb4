//! HTTP edge subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, route table mounting, middleware)
//!     → request.rs (request ID)
//!     → dispatch layer (gates + action)
//!     → response.rs (header layering, JSON encoding, timing mitigation)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ResponseEmitter;
pub use server::ApiServer;
