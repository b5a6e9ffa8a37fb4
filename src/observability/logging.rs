//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem once at startup
//! - Honor `RUST_LOG` with a configured fallback level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber. Call once, from the binary.
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("route_gate={0},tower_http={0}", default_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
