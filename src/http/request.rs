//! Request identity.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Propagate the ID to the response and into log fields
//!
//! # Design Decisions
//! - Request ID added as early as possible so every log line carries it
//! - Realized with tower-http's request-id machinery; only the generator
//!   is ours

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// UUID-v4 request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}
