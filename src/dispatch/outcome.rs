//! Endpoint action results.
//!
//! The action's return value is a sum type rather than a "response already
//! sent" flag: either a bare body value, a full descriptor, or a complete
//! HTTP response the action built itself.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde_json::Value;

/// What an endpoint action produced.
pub enum HandlerOutcome {
    /// Plain value emitted as the response body with default status and
    /// headers. A null value here is a contract violation (a handler must
    /// return a real body or take over the response entirely).
    Value(Value),

    /// Full control over status, headers, and body.
    Descriptor(ResponseDescriptor),

    /// The action already produced a complete HTTP response; it is emitted
    /// as-is with no further synthesis.
    Manual(Response),
}

impl From<Value> for HandlerOutcome {
    fn from(value: Value) -> Self {
        HandlerOutcome::Value(value)
    }
}

impl From<ResponseDescriptor> for HandlerOutcome {
    fn from(descriptor: ResponseDescriptor) -> Self {
        HandlerOutcome::Descriptor(descriptor)
    }
}

/// A handler-authored response: body plus optional status and headers.
#[derive(Debug, Default)]
pub struct ResponseDescriptor {
    /// Response body; `None` reaching emission is a contract violation.
    pub body: Option<Value>,

    /// Status code; defaults to 200 when unset.
    pub status: Option<StatusCode>,

    /// Headers layered over the configured defaults.
    pub headers: HeaderMap,
}

impl ResponseDescriptor {
    pub fn new(body: Value) -> Self {
        Self {
            body: Some(body),
            status: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}
