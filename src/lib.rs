//! Per-route request-dispatch gate.
//!
//! Sits between the axum router and application-defined endpoint actions:
//! normalizes endpoint definitions at registration, enforces authentication
//! and role/scope authorization per request, invokes the matched action, and
//! converts its result into a well-formed HTTP response, with randomized
//! delays on 401/403 so failure latency leaks nothing.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use auth::{AuthGate, AuthVerdict, BearerResolver, CredentialResolver, MemoryStore, Principal, PrincipalStore};
pub use config::GateConfig;
pub use dispatch::{HandlerOutcome, RequestContext, ResponseDescriptor};
pub use http::ApiServer;
pub use lifecycle::Shutdown;
pub use routing::{EndpointDef, EndpointSet, RouteOptions, RouteRegistry};
