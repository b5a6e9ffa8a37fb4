//! HTTP server setup and route mounting.
//!
//! # Responsibilities
//! - Mount the registered route table onto an axum Router
//! - Bind one dispatcher-backed handler per allowed method
//! - Answer rejected methods with 405 and the precomputed `Allow` header
//! - Wire up middleware (timeout, request ID, tracing)
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - Routes mount under the API path unless registered with the root flag
//! - The registry's `*` pattern translates to axum's `/{*rest}` catch-all
//! - Per-route state is captured in the handler closures; no global
//!   mutable state at request time

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{RawPathParams, Request};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::gate::AuthGate;
use crate::auth::principal::{CredentialResolver, PrincipalStore};
use crate::config::schema::{ApiConfig, GateConfig};
use crate::dispatch::context::RequestContext;
use crate::dispatch::dispatcher::Dispatcher;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::http::response::ResponseEmitter;
use crate::lifecycle::Shutdown;
use crate::routing::registry::{Route, RouteRegistry};

/// The dispatch gate's HTTP server: the mounted route table plus the
/// middleware stack, ready to serve.
pub struct ApiServer {
    router: Router,
    config: GateConfig,
}

impl ApiServer {
    /// Assemble the server from a validated config, a populated registry,
    /// and the auth collaborators.
    pub fn new(
        config: GateConfig,
        registry: RouteRegistry,
        resolver: Arc<dyn CredentialResolver>,
        store: Arc<dyn PrincipalStore>,
    ) -> Self {
        let emitter = ResponseEmitter::from_config(&config.api);
        let auth = AuthGate::new(resolver, store, config.auth.token_field.clone());
        let dispatcher = Arc::new(Dispatcher::new(auth, emitter.clone()));

        let router = build_router(&config, registry, dispatcher, emitter);
        Self { router, config }
    }

    /// The assembled axum router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Serve until the shutdown coordinator triggers.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Dispatch gate starting");

        let mut rx = shutdown.subscribe();
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
            })
            .await?;

        tracing::info!("Dispatch gate stopped");
        Ok(())
    }
}

/// Mount every registered route and layer the middleware stack.
fn build_router(
    config: &GateConfig,
    registry: RouteRegistry,
    dispatcher: Arc<Dispatcher>,
    emitter: ResponseEmitter,
) -> Router {
    let body_limit = config.security.max_body_size;
    let mut app = Router::new();

    for route in registry.into_routes() {
        let path = mount_path(&config.api, &route);
        let mut method_router = MethodRouter::new();

        for (method, endpoint) in route.endpoints {
            let Ok(filter) = MethodFilter::try_from(method) else {
                continue;
            };
            let dispatcher = dispatcher.clone();
            let endpoint = Arc::new(endpoint);
            let pattern = path.clone();

            method_router = method_router.on(
                filter,
                move |params: RawPathParams, request: Request| {
                    let dispatcher = dispatcher.clone();
                    let endpoint = endpoint.clone();
                    let pattern = pattern.clone();
                    async move {
                        let ctx = build_context(pattern, &params, request, body_limit).await;
                        dispatcher.dispatch(&endpoint, ctx).await
                    }
                },
            );
        }

        // Any method without an endpoint answers 405 with the allowed set.
        let allow = route.allow_header.clone();
        let emitter = emitter.clone();
        method_router = method_router.fallback(move || {
            let emitter = emitter.clone();
            let allow = allow.clone();
            async move { rejected_method(&emitter, &allow).await }
        });

        app = app.route(&path, method_router);
    }

    app.layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
}

/// Build the per-request context from the matched request.
async fn build_context(
    route: String,
    params: &RawPathParams,
    request: Request,
    body_limit: usize,
) -> RequestContext {
    let (parts, body) = request.into_parts();

    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let query: HashMap<String, String> = parts
        .uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let params: HashMap<String, String> = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let body = match axum::body::to_bytes(body, body_limit).await {
        Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes).ok(),
        Ok(_) => None,
        Err(error) => {
            tracing::debug!(request_id = %request_id, error = %error, "Failed to read request body");
            None
        }
    };

    RequestContext {
        request_id,
        method: parts.method,
        path: parts.uri.path().to_string(),
        route,
        params,
        query,
        headers: parts.headers,
        body,
        principal: None,
        principal_id: None,
    }
}

/// Synthesized response for methods outside the route's endpoint map.
async fn rejected_method(emitter: &ResponseEmitter, allow: &str) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(allow) {
        headers.insert(header::ALLOW, value);
    }
    emitter
        .respond(
            Some(json!({"error": "API endpoint does not exist"})),
            StatusCode::METHOD_NOT_ALLOWED,
            headers,
        )
        .await
}

/// Resolve a route's full mount path.
fn mount_path(api: &ApiConfig, route: &Route) -> String {
    let base = if route.root {
        api.api_root.as_str()
    } else {
        api.api_path.as_str()
    };
    let path = if route.path == "*" {
        "/{*rest}"
    } else {
        route.path.as_str()
    };
    join_paths(base, path)
}

fn join_paths(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (base.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => base.to_string(),
        (_, false) => format!("{}/{}", base, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::registry::RouteOptions;

    fn route(path: &str, root: bool) -> Route {
        let mut registry = RouteRegistry::new();
        registry
            .register(
                path,
                RouteOptions {
                    root,
                    ..Default::default()
                },
                crate::routing::endpoint::EndpointSet::new(),
            )
            .unwrap();
        registry.into_routes().remove(0)
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/", "/status"), "/status");
        assert_eq!(join_paths("/api", "/user"), "/api/user");
        assert_eq!(join_paths("/api", "/"), "/api");
        assert_eq!(join_paths("/", "/"), "/");
        assert_eq!(join_paths("/api/", "/user/{id}"), "/api/user/{id}");
    }

    #[test]
    fn test_mount_path_honors_root_flag() {
        let api = ApiConfig::default();
        assert_eq!(mount_path(&api, &route("/user", false)), "/api/user");
        assert_eq!(mount_path(&api, &route("/user", true)), "/user");
    }

    #[test]
    fn test_wildcard_translates_to_catch_all() {
        let api = ApiConfig::default();
        assert_eq!(mount_path(&api, &route("*", true)), "/{*rest}");
        assert_eq!(mount_path(&api, &route("*", false)), "/api/{*rest}");
    }
}
