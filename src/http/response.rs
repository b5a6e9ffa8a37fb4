//! Response synthesis and emission.
//!
//! # Responsibilities
//! - Layer per-response headers over the configured defaults
//! - Encode JSON-family bodies (pretty or compact); pass others through
//! - Delay 401/403 writes by a random duration to blunt timing probes
//!
//! # Design Decisions
//! - `http::HeaderMap` is the header container: keys are lowercased on
//!   insertion, so normalization is structural rather than a separate pass
//! - The mitigation delay is drawn per request from a thread-local RNG;
//!   no timer state is shared across requests
//! - The sleep runs inside the request's own future, so a client
//!   disconnect cancels it along with the rest of the request

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::config::schema::ApiConfig;

/// Lower mitigation delay bound, inclusive.
const MITIGATION_MIN_MS: u64 = 500;
/// Upper mitigation delay bound, exclusive.
const MITIGATION_MAX_MS: u64 = 1000;

/// Converts handler results and synthesized errors into HTTP responses.
#[derive(Clone)]
pub struct ResponseEmitter {
    default_headers: HeaderMap,
    pretty_json: bool,
}

impl ResponseEmitter {
    /// Build an emitter from the API configuration. Default headers are
    /// parsed once here; entries rejected by config validation never reach
    /// this point.
    pub fn from_config(api: &ApiConfig) -> Self {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &api.default_headers {
            if let (Ok(name), Ok(value)) =
                (name.parse::<HeaderName>(), value.parse::<HeaderValue>())
            {
                default_headers.insert(name, value);
            }
        }
        Self {
            default_headers,
            pretty_json: api.pretty_json,
        }
    }

    /// Emit a response: layered headers, encoded body, mitigation delay for
    /// 401/403.
    pub async fn respond(
        &self,
        body: Option<Value>,
        status: StatusCode,
        headers: HeaderMap,
    ) -> Response {
        let mut effective = self.default_headers.clone();
        for (name, value) in &headers {
            effective.insert(name.clone(), value.clone());
        }

        let json_body = effective
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(true);

        let payload = match body {
            None => String::new(),
            Some(value) if json_body => {
                if self.pretty_json {
                    serde_json::to_string_pretty(&value).unwrap_or_default()
                } else {
                    value.to_string()
                }
            }
            Some(Value::String(text)) => text,
            Some(value) => value.to_string(),
        };

        mitigation_delay(status).await;

        let mut response = Response::new(Body::from(payload));
        *response.status_mut() = status;
        *response.headers_mut() = effective;
        response
    }
}

/// JSON-family content types get their bodies serialized as JSON text.
fn is_json_content_type(content_type: &str) -> bool {
    content_type.contains("json") || content_type.contains("javascript")
}

/// Hold back authentication/authorization failures so their latency does
/// not leak which stage rejected the request.
async fn mitigation_delay(status: StatusCode) {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tokio::time::sleep(mitigation_jitter()).await;
    }
}

/// Uniform random delay in [500ms, 1000ms), drawn independently per call.
fn mitigation_jitter() -> Duration {
    Duration::from_millis(fastrand::u64(MITIGATION_MIN_MS..MITIGATION_MAX_MS))
}
