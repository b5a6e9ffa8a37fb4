//! Per-request orchestration.
//!
//! # Responsibilities
//! - Run the endpoint pipeline: auth gate → role gate → action
//! - Short-circuit gate failures to synthesized 401/403 responses
//! - Convert action outcomes and errors into emitted responses
//! - Record a dispatch metric per request
//!
//! # Design Decisions
//! - Gates never run for endpoints that do not require them
//! - An action error surfaces as a 500 JSON envelope rather than a dropped
//!   connection (the upstream swallow behavior is a documented bug)
//! - A null or absent body without manual completion is a contract
//!   violation, logged with the offending method and path

use std::time::Instant;

use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};

use crate::auth::gate::{AuthGate, AuthVerdict};
use crate::auth::roles;
use crate::dispatch::context::RequestContext;
use crate::dispatch::outcome::HandlerOutcome;
use crate::http::response::ResponseEmitter;
use crate::observability::metrics;
use crate::routing::endpoint::Endpoint;

/// Orchestrates the endpoint pipeline for every matched request.
pub struct Dispatcher {
    auth: AuthGate,
    emitter: ResponseEmitter,
}

impl Dispatcher {
    pub fn new(auth: AuthGate, emitter: ResponseEmitter) -> Self {
        Self { auth, emitter }
    }

    /// Run one request through the gate pipeline and produce its response.
    pub async fn dispatch(&self, endpoint: &Endpoint, mut ctx: RequestContext) -> Response {
        let start = Instant::now();
        let method = ctx.method.clone();
        let route = ctx.route.clone();
        let path = ctx.path.clone();
        let request_id = ctx.request_id.clone();

        if endpoint.auth_required {
            match self.auth.authenticate(&ctx).await {
                AuthVerdict::Granted(principal) => {
                    ctx.principal_id = Some(principal.id.clone());
                    ctx.principal = Some(principal);
                }
                AuthVerdict::Denied(data) => {
                    tracing::debug!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        "Authentication failed"
                    );
                    let body = error_envelope(data, "unauthorized");
                    return self
                        .finish(&method, &route, StatusCode::UNAUTHORIZED, Some(body), start)
                        .await;
                }
            }
        }

        if !roles::authorize(ctx.principal.as_ref(), endpoint) {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                principal_id = ctx.principal_id.as_deref().unwrap_or("none"),
                "Authorization failed"
            );
            let body = error_envelope(None, "forbidden");
            return self
                .finish(&method, &route, StatusCode::FORBIDDEN, Some(body), start)
                .await;
        }

        match (endpoint.action)(ctx).await {
            Ok(HandlerOutcome::Manual(response)) => {
                metrics::record_dispatch(method.as_str(), &route, response.status().as_u16(), start);
                response
            }
            Ok(HandlerOutcome::Value(value)) if value.is_null() => {
                self.contract_violation(&method, &path, &route, start).await
            }
            Ok(HandlerOutcome::Value(value)) => {
                let response = self
                    .emitter
                    .respond(Some(value), StatusCode::OK, HeaderMap::new())
                    .await;
                metrics::record_dispatch(method.as_str(), &route, StatusCode::OK.as_u16(), start);
                response
            }
            Ok(HandlerOutcome::Descriptor(descriptor)) => match descriptor.body {
                None => self.contract_violation(&method, &path, &route, start).await,
                Some(body) => {
                    let status = descriptor.status.unwrap_or(StatusCode::OK);
                    let response = self
                        .emitter
                        .respond(Some(body), status, descriptor.headers)
                        .await;
                    metrics::record_dispatch(method.as_str(), &route, status.as_u16(), start);
                    response
                }
            },
            Err(error) => {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    error = %error,
                    "Endpoint action failed"
                );
                let body = error_envelope(None, "internal server error");
                self.finish(&method, &route, StatusCode::INTERNAL_SERVER_ERROR, Some(body), start)
                    .await
            }
        }
    }

    async fn finish(
        &self,
        method: &Method,
        route: &str,
        status: StatusCode,
        body: Option<Value>,
        start: Instant,
    ) -> Response {
        let response = self.emitter.respond(body, status, HeaderMap::new()).await;
        metrics::record_dispatch(method.as_str(), route, status.as_u16(), start);
        response
    }

    async fn contract_violation(
        &self,
        method: &Method,
        path: &str,
        route: &str,
        start: Instant,
    ) -> Response {
        tracing::error!(
            method = %method,
            path = %path,
            "Endpoint action for {} {} returned no response body without taking over the response",
            method,
            path
        );
        let body = error_envelope(None, "internal server error");
        self.finish(method, route, StatusCode::INTERNAL_SERVER_ERROR, Some(body), start)
            .await
    }
}

/// Standard failure envelope; a structured error from the auth resolver
/// replaces the fallback message.
fn error_envelope(data: Option<Value>, fallback: &str) -> Value {
    match data {
        Some(error) => json!({ "error": error }),
        None => json!({ "error": fallback }),
    }
}
