//! Dispatch gate binary.
//!
//! Loads configuration, declares the built-in routes, and serves until a
//! shutdown signal arrives. Applications embedding the gate as a library
//! wire their own registry and auth collaborators instead.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tokio::net::TcpListener;

use route_gate::auth::{BearerResolver, MemoryStore, Principal};
use route_gate::config::{loader, GateConfig};
use route_gate::dispatch::HandlerOutcome;
use route_gate::http::ApiServer;
use route_gate::lifecycle::{signals, Shutdown};
use route_gate::observability::{logging, metrics};
use route_gate::routing::{EndpointDef, EndpointSet, RouteOptions, RouteRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first so the log level honors it.
    let config = match std::env::args().nth(1) {
        Some(path) => loader::load_config(Path::new(&path))?,
        None => GateConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_path = %config.api.api_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = demo_registry()?;
    let store = demo_store(&config);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::listen_for_ctrl_c(&shutdown);

    let server = ApiServer::new(config, registry, Arc::new(BearerResolver), store);
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Routes served by the standalone binary: a public status endpoint and an
/// admin-only echo of the authenticated principal.
fn demo_registry() -> Result<RouteRegistry, route_gate::routing::RegistryError> {
    let started = Instant::now();
    let mut registry = RouteRegistry::new();

    registry.register(
        "/status",
        RouteOptions {
            root: true,
            ..Default::default()
        },
        EndpointSet::new().get(EndpointDef::handler(move |_ctx| async move {
            Ok(HandlerOutcome::Value(json!({
                "status": "ok",
                "uptime_secs": started.elapsed().as_secs(),
            })))
        })),
    )?;

    registry.register(
        "/whoami",
        RouteOptions {
            role_required: Some(vec!["admin".into()]),
            ..Default::default()
        },
        EndpointSet::new().get(EndpointDef::handler(|ctx| async move {
            Ok(HandlerOutcome::Value(json!({
                "principal_id": ctx.principal_id,
                "roles": ctx.principal.map(|p| p.roles),
            })))
        })),
    )?;

    Ok(registry)
}

/// Demo principal store; real deployments inject their own.
fn demo_store(config: &GateConfig) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.insert(
        &config.auth.token_field,
        "local-admin-token",
        Principal {
            id: "admin".into(),
            roles: ["admin".to_string()].into(),
            scopes: Default::default(),
            record: json!({"name": "Local Admin"}),
        },
    );
    Arc::new(store)
}
