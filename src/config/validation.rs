//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check mount prefixes are absolute paths
//! - Check default headers parse as valid header names/values
//! - Validate value ranges (timeouts > 0, body limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::GateConfig;

/// A single semantic validation failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("{field} {value:?} must start with '/'")]
    RelativeMountPath { field: &'static str, value: String },

    #[error("auth.token_field must not be empty")]
    EmptyTokenField,

    #[error("api.default_headers entry {0:?} is not a valid header name")]
    InvalidHeaderName(String),

    #[error("api.default_headers value for {0:?} is not a valid header value")]
    InvalidHeaderValue(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration, collecting every failure.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (field, value) in [
        ("api.api_root", &config.api.api_root),
        ("api.api_path", &config.api.api_path),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::RelativeMountPath {
                field,
                value: value.clone(),
            });
        }
    }

    if config.auth.token_field.is_empty() {
        errors.push(ValidationError::EmptyTokenField);
    }

    for (name, value) in &config.api.default_headers {
        if name.parse::<HeaderName>().is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        }
        if value.parse::<HeaderValue>().is_err() {
            errors.push(ValidationError::InvalidHeaderValue(name.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
