//! Endpoint definitions and policy normalization.
//!
//! # Responsibilities
//! - Model one HTTP method's handler plus its resolved auth/role policy
//! - Resolve the duck-typed registration shape (bare handler vs configured)
//!   into a single canonical record at registration time
//! - Merge route-level policy defaults with per-endpoint overrides
//!
//! # Design Decisions
//! - Normalization runs once, at registration; the dispatcher never inspects
//!   registration shapes at request time
//! - Role sets are unioned across route and endpoint; an empty union
//!   canonicalizes to "no restriction"
//! - A non-empty role requirement forces authentication on

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use futures_util::future::BoxFuture;
use tower::BoxError;

use crate::dispatch::context::RequestContext;
use crate::dispatch::outcome::HandlerOutcome;
use crate::routing::registry::RouteOptions;

/// What an endpoint action resolves to: an outcome to emit, or an error the
/// dispatcher converts into a 500.
pub type HandlerResult = Result<HandlerOutcome, BoxError>;

/// Boxed async handler invoked with the per-request context.
pub type Action = Arc<dyn Fn(RequestContext) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Wrap an async function into an [`Action`].
pub fn action<F, Fut>(f: F) -> Action
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Registration-time shape of one method handler.
///
/// Mirrors the two ways applications declare endpoints: a bare handler with
/// no policy of its own, or a configured form carrying explicit overrides.
#[derive(Clone)]
pub enum EndpointDef {
    /// Bare handler; policy comes entirely from route-level defaults.
    Handler(Action),

    /// Handler with explicit policy overrides.
    Configured {
        action: Action,
        auth_required: Option<bool>,
        role_required: Option<Vec<String>>,
        scope_required: Option<Vec<String>>,
    },
}

impl EndpointDef {
    /// Convenience constructor for the bare form.
    pub fn handler<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        EndpointDef::Handler(action(f))
    }

    /// Resolve this definition into a canonical [`Endpoint`], merging the
    /// route-level defaults. Normalization is idempotent: feeding an
    /// endpoint's own policy back through yields the same policy.
    pub(crate) fn normalize(self, defaults: &RouteOptions) -> Endpoint {
        let (action, auth_override, roles, scopes) = match self {
            EndpointDef::Handler(action) => (action, None, None, None),
            EndpointDef::Configured {
                action,
                auth_required,
                role_required,
                scope_required,
            } => (action, auth_required, role_required, scope_required),
        };

        let role_required = union_sets(defaults.role_required.as_deref(), roles.as_deref());
        let scope_required = if role_required.is_some() {
            union_sets(defaults.scope_required.as_deref(), scopes.as_deref())
        } else {
            // Scopes are only meaningful alongside a role requirement.
            None
        };

        let auth_required = auth_override
            .or(defaults.auth_required)
            .unwrap_or(false)
            || role_required.is_some();

        Endpoint {
            action,
            auth_required,
            role_required,
            scope_required,
        }
    }
}

/// Union two optional name lists; an empty union canonicalizes to `None`.
fn union_sets(a: Option<&[String]>, b: Option<&[String]>) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = a
        .into_iter()
        .flatten()
        .chain(b.into_iter().flatten())
        .cloned()
        .collect();
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}

/// One HTTP method's handler plus resolved policy for a route.
#[derive(Clone)]
pub struct Endpoint {
    /// The handler invoked once both gates pass.
    pub action: Action,

    /// Whether the Auth Gate runs for this endpoint.
    pub auth_required: bool,

    /// Roles of which the principal must hold at least one; `None` means no
    /// role restriction.
    pub role_required: Option<BTreeSet<String>>,

    /// Scopes of which the principal must hold at least one; only meaningful
    /// when `role_required` is set.
    pub scope_required: Option<BTreeSet<String>>,
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("auth_required", &self.auth_required)
            .field("role_required", &self.role_required)
            .field("scope_required", &self.scope_required)
            .finish_non_exhaustive()
    }
}

/// Per-method endpoint definitions for one route, built fluently in the
/// style of axum's `get(h).post(h)` method routers.
#[derive(Default)]
pub struct EndpointSet {
    defs: HashMap<Method, EndpointDef>,
}

impl EndpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a definition for an arbitrary method.
    pub fn on(mut self, method: Method, def: EndpointDef) -> Self {
        self.defs.insert(method, def);
        self
    }

    pub fn get(self, def: EndpointDef) -> Self {
        self.on(Method::GET, def)
    }

    pub fn post(self, def: EndpointDef) -> Self {
        self.on(Method::POST, def)
    }

    pub fn put(self, def: EndpointDef) -> Self {
        self.on(Method::PUT, def)
    }

    pub fn patch(self, def: EndpointDef) -> Self {
        self.on(Method::PATCH, def)
    }

    pub fn delete(self, def: EndpointDef) -> Self {
        self.on(Method::DELETE, def)
    }

    pub fn options(self, def: EndpointDef) -> Self {
        self.on(Method::OPTIONS, def)
    }

    pub(crate) fn into_defs(self) -> HashMap<Method, EndpointDef> {
        self.defs
    }
}
