//! Shared utilities for the integration suite.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;

use route_gate::auth::{BearerResolver, CredentialResolver, MemoryStore, Principal};
use route_gate::config::GateConfig;
use route_gate::http::ApiServer;
use route_gate::lifecycle::Shutdown;
use route_gate::routing::RouteRegistry;

/// Store with two known principals: an admin (`admin-token`) and a plain
/// user (`user-token`).
pub fn seeded_store(token_field: &str) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.insert(
        token_field,
        "admin-token",
        Principal {
            id: "admin-1".into(),
            roles: ["admin".to_string()].into(),
            scopes: ["write".to_string()].into(),
            record: json!({"name": "Ada"}),
        },
    );
    store.insert(
        token_field,
        "user-token",
        Principal {
            id: "user-1".into(),
            roles: ["user".to_string()].into(),
            scopes: ["read".to_string()].into(),
            record: json!({"name": "Uma"}),
        },
    );
    Arc::new(store)
}

/// Spawn a gate on an ephemeral port with the default config and bearer
/// resolver. Returns the base URL and the shutdown handle.
pub async fn start_gate(registry: RouteRegistry) -> (String, Shutdown) {
    start_gate_with(GateConfig::default(), registry, Arc::new(BearerResolver)).await
}

/// Spawn a gate with a custom config and credential resolver.
pub async fn start_gate_with(
    mut config: GateConfig,
    registry: RouteRegistry,
    resolver: Arc<dyn CredentialResolver>,
) -> (String, Shutdown) {
    config.listener.bind_address = "127.0.0.1:0".into();
    let store = seeded_store(&config.auth.token_field);

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = ApiServer::new(config, registry, resolver, store);

    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, &server_shutdown).await;
    });

    // Give the acceptor a moment to come up.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://{}", addr), shutdown)
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
