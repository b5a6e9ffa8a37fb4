//! Route and endpoint modeling subsystem.
//!
//! # Data Flow
//! ```text
//! application route declarations
//!     → endpoint.rs (duck-typed defs resolved to canonical Endpoints)
//!     → registry.rs (collision check, method partition, route table)
//!     → http/server.rs mounts the table onto the axum router
//! ```
//!
//! # Design Decisions
//! - Registration happens once at startup; the table is immutable afterwards
//! - Policy resolution (auth/role merging) runs at registration, not per request
//! - Explicit collision errors rather than silent overwrite

pub mod endpoint;
pub mod registry;

pub use endpoint::{action, Action, Endpoint, EndpointDef, EndpointSet, HandlerResult};
pub use registry::{Route, RouteOptions, RouteRegistry, RegistryError, METHOD_UNIVERSE};
