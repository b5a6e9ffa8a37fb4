//! Principals and the external credential seams.

use std::collections::BTreeSet;

use async_trait::async_trait;
use axum::http::header;
use serde::{Deserialize, Serialize};

use crate::dispatch::context::RequestContext;

/// The authenticated identity attached to a request after the Auth Gate
/// passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identifier of the principal.
    pub id: String,

    /// Role names held by the principal.
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Scope names held by the principal.
    #[serde(default)]
    pub scopes: BTreeSet<String>,

    /// Raw user record as returned by the store.
    #[serde(default)]
    pub record: serde_json::Value,
}

/// What a [`CredentialResolver`] extracted from a request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Bearer token to look up in the principal store.
    pub token: Option<String>,

    /// Structured error to surface to the caller in the 401 envelope.
    pub error: Option<serde_json::Value>,
}

/// Inspects a request and extracts credentials, if any are present.
///
/// Configured once at server construction. Returning `None` means "no
/// credentials"; returning an error inside [`Credentials`] fails the gate
/// with that error as response data.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, ctx: &RequestContext) -> Option<Credentials>;
}

/// Looks up the user record matching a token, keyed by the configured
/// token field name.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn lookup(&self, token_field: &str, token: &str) -> Option<Principal>;
}

/// Standard `Authorization: Bearer <token>` resolver.
#[derive(Debug, Clone, Default)]
pub struct BearerResolver;

#[async_trait]
impl CredentialResolver for BearerResolver {
    async fn resolve(&self, ctx: &RequestContext) -> Option<Credentials> {
        let header = ctx
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())?;
        let token = header.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            return None;
        }
        Some(Credentials {
            token: Some(token.to_string()),
            error: None,
        })
    }
}
