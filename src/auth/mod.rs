//! Authentication and authorization subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → principal.rs (CredentialResolver extracts token or error)
//!     → gate.rs (store lookup, verdict, principal attachment)
//!     → roles.rs (role/scope check against the endpoint policy)
//! ```
//!
//! # Design Decisions
//! - Credential resolution and storage live behind traits; the gate only
//!   sequences them
//! - The gate returns a verdict, it never writes the response itself
//! - Role and scope checks are pure functions over the resolved policy

pub mod gate;
pub mod principal;
pub mod roles;
pub mod store;

pub use gate::{AuthGate, AuthVerdict};
pub use principal::{BearerResolver, CredentialResolver, Credentials, Principal, PrincipalStore};
pub use store::MemoryStore;
