//! Per-request context handed to endpoint actions.

use std::collections::HashMap;

use axum::http::{HeaderMap, Method};

use crate::auth::principal::Principal;

/// Everything an endpoint action can see about the request it serves.
///
/// Built fresh for each matched request and owned by that request's task;
/// the principal fields are populated by the dispatcher once the Auth Gate
/// succeeds.
#[derive(Debug)]
pub struct RequestContext {
    /// Request id generated at the edge (UUID v4).
    pub request_id: String,

    /// HTTP method of the request.
    pub method: Method,

    /// Raw request path as received.
    pub path: String,

    /// The mounted route pattern that matched.
    pub route: String,

    /// Path parameters extracted by the router.
    pub params: HashMap<String, String>,

    /// Query-string parameters.
    pub query: HashMap<String, String>,

    /// Request headers.
    pub headers: HeaderMap,

    /// Parsed JSON request body, when present and well-formed.
    pub body: Option<serde_json::Value>,

    /// Authenticated principal, set after the Auth Gate passes.
    pub principal: Option<Principal>,

    /// Identifier of the authenticated principal.
    pub principal_id: Option<String>,
}

impl RequestContext {
    /// Fetch a request header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> RequestContext {
    RequestContext {
        request_id: "test".into(),
        method: Method::GET,
        path: "/test".into(),
        route: "/test".into(),
        params: HashMap::new(),
        query: HashMap::new(),
        headers: HeaderMap::new(),
        body: None,
        principal: None,
        principal_id: None,
    }
}
