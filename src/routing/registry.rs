//! Route registration and the startup route table.
//!
//! # Responsibilities
//! - Own the set of registered path patterns
//! - Detect duplicate registrations (fatal configuration error)
//! - Inject a default OPTIONS endpoint where the caller supplied none
//! - Partition the method universe into allowed and rejected methods
//!
//! # Design Decisions
//! - Immutable after registration; shared read-only at request time
//! - The literal `*` and `/` paths skip the collision check so the same
//!   pattern can be mounted at both the API root and the true root
//! - The `Allow` header value is precomputed per route, in fixed universe
//!   order, so rejected-method responses cost nothing at request time

use std::collections::{HashMap, HashSet};

use axum::http::Method;
use serde_json::json;
use thiserror::Error;

use crate::dispatch::outcome::HandlerOutcome;
use crate::routing::endpoint::{action, Endpoint, EndpointDef, EndpointSet};

/// The fixed set of methods every route partitions into allowed/rejected.
pub const METHOD_UNIVERSE: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Fatal registration errors, raised at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("route collision: {path:?} is already registered")]
    RouteCollision { path: String },
}

/// Route-level defaults applied to every non-OPTIONS endpoint.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Mount under the true root prefix instead of the API path.
    pub root: bool,

    /// Default authentication requirement for the route's endpoints.
    pub auth_required: Option<bool>,

    /// Roles required on every endpoint (unioned with per-endpoint roles).
    pub role_required: Option<Vec<String>>,

    /// Scopes required on every endpoint (unioned with per-endpoint scopes).
    pub scope_required: Option<Vec<String>>,
}

/// A registered path pattern with its per-method endpoint map.
pub struct Route {
    /// The path pattern as registered (before mounting).
    pub path: String,

    /// Mount under the true root rather than the API path.
    pub root: bool,

    /// Normalized endpoint per method.
    pub endpoints: HashMap<Method, Endpoint>,

    /// Methods with a registered endpoint, in universe order.
    pub allowed: Vec<Method>,

    /// Universe methods without a registered endpoint.
    pub rejected: Vec<Method>,

    /// Precomputed `Allow` header value: uppercase, comma-separated.
    pub allow_header: String,
}

/// Startup-time route table. Built once, then handed to the router
/// assembly; never mutated afterwards.
pub struct RouteRegistry {
    routes: Vec<Route>,
    registered: HashSet<(bool, String)>,
    default_options: EndpointDef,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            registered: HashSet::new(),
            default_options: EndpointDef::Handler(action(|_ctx| async {
                Ok(HandlerOutcome::Value(json!({})))
            })),
        }
    }

    /// Replace the endpoint injected for routes that do not define OPTIONS.
    pub fn set_default_options(&mut self, def: EndpointDef) {
        self.default_options = def;
    }

    /// Register a path pattern with its endpoint definitions.
    ///
    /// Fails if the pattern was already registered at the same mount point,
    /// except for the literal `*` and `/` patterns.
    pub fn register(
        &mut self,
        path: impl Into<String>,
        options: RouteOptions,
        endpoints: EndpointSet,
    ) -> Result<(), RegistryError> {
        let path = path.into();

        let exempt = path == "*" || path == "/";
        if !exempt {
            let key = (options.root, path.clone());
            if !self.registered.insert(key) {
                return Err(RegistryError::RouteCollision { path });
            }
        }

        let mut defs = endpoints.into_defs();
        defs.entry(Method::OPTIONS)
            .or_insert_with(|| self.default_options.clone());

        let mut normalized = HashMap::with_capacity(defs.len());
        for (method, def) in defs {
            // OPTIONS answers uniformly and never inherits route policy.
            let endpoint = if method == Method::OPTIONS {
                def.normalize(&RouteOptions::default())
            } else {
                def.normalize(&options)
            };
            normalized.insert(method, endpoint);
        }

        let allowed: Vec<Method> = METHOD_UNIVERSE
            .iter()
            .filter(|m| normalized.contains_key(*m))
            .cloned()
            .collect();
        let rejected: Vec<Method> = METHOD_UNIVERSE
            .iter()
            .filter(|m| !normalized.contains_key(*m))
            .cloned()
            .collect();
        let allow_header = allowed
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        tracing::debug!(
            path = %path,
            root = options.root,
            allow = %allow_header,
            "Route registered"
        );

        self.routes.push(Route {
            path,
            root: options.root,
            endpoints: normalized,
            allowed,
            rejected,
            allow_header,
        });
        Ok(())
    }

    /// Iterate registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub(crate) fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
