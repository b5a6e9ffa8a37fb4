//! The authentication gate.
//!
//! # Responsibilities
//! - Sequence credential resolution and the store lookup
//! - Produce a verdict the dispatcher converts into principal attachment
//!   or a 401 response
//!
//! # Design Decisions
//! - A resolver-reported error fails the gate before any store lookup and
//!   is carried to the caller as structured response data
//! - No credentials and an unknown token are indistinguishable in the
//!   verdict (both deny with no data); the timing mitigation in the
//!   response emitter keeps them indistinguishable on the wire too

use std::sync::Arc;

use crate::auth::principal::{CredentialResolver, Principal, PrincipalStore};
use crate::dispatch::context::RequestContext;

/// Outcome of the authentication gate for one request.
#[derive(Debug)]
pub enum AuthVerdict {
    /// Credentials resolved to a known principal.
    Granted(Principal),

    /// Authentication failed; optional structured error for the caller.
    Denied(Option<serde_json::Value>),
}

impl AuthVerdict {
    pub fn is_granted(&self) -> bool {
        matches!(self, AuthVerdict::Granted(_))
    }
}

/// Runs authentication for endpoints that require it.
pub struct AuthGate {
    resolver: Arc<dyn CredentialResolver>,
    store: Arc<dyn PrincipalStore>,
    token_field: String,
}

impl AuthGate {
    pub fn new(
        resolver: Arc<dyn CredentialResolver>,
        store: Arc<dyn PrincipalStore>,
        token_field: String,
    ) -> Self {
        Self {
            resolver,
            store,
            token_field,
        }
    }

    /// Authenticate the request behind `ctx`.
    pub async fn authenticate(&self, ctx: &RequestContext) -> AuthVerdict {
        let Some(credentials) = self.resolver.resolve(ctx).await else {
            return AuthVerdict::Denied(None);
        };

        if let Some(error) = credentials.error {
            tracing::debug!(
                request_id = %ctx.request_id,
                "Credential resolver reported an error"
            );
            return AuthVerdict::Denied(Some(error));
        }

        let Some(token) = credentials.token else {
            return AuthVerdict::Denied(None);
        };

        match self.store.lookup(&self.token_field, &token).await {
            Some(principal) => {
                tracing::debug!(
                    request_id = %ctx.request_id,
                    principal_id = %principal.id,
                    "Principal authenticated"
                );
                AuthVerdict::Granted(principal)
            }
            None => AuthVerdict::Denied(None),
        }
    }
}
