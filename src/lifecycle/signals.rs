//! OS signal handling.
//!
//! Translates Ctrl-C into a shutdown trigger. Uses Tokio's async-safe
//! signal handling.

use crate::lifecycle::shutdown::Shutdown;

/// Spawn a task that triggers shutdown on Ctrl-C.
pub fn listen_for_ctrl_c(shutdown: &Shutdown) {
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });
}
