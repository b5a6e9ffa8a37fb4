//! End-to-end tests for the dispatch pipeline: registration, method
//! partition, role gating, and response synthesis.

use axum::http::{HeaderValue, StatusCode};
use serde_json::{json, Value};

use route_gate::dispatch::{HandlerOutcome, ResponseDescriptor};
use route_gate::routing::{EndpointDef, EndpointSet, RouteOptions, RouteRegistry};

mod common;

#[tokio::test]
async fn test_plain_get_returns_handler_value_as_json() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/widgets",
            RouteOptions::default(),
            EndpointSet::new().get(EndpointDef::handler(|_ctx| async {
                Ok(HandlerOutcome::Value(json!({"widgets": ["a", "b"]})))
            })),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/widgets", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("json"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"widgets": ["a", "b"]}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_options_is_answered_without_boilerplate() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/widgets",
            RouteOptions::default(),
            EndpointSet::new().get(EndpointDef::handler(|_ctx| async {
                Ok(HandlerOutcome::Value(json!({})))
            })),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    let res = client
        .request(reqwest::Method::OPTIONS, format!("{}/api/widgets", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
}

#[tokio::test]
async fn test_rejected_method_gets_405_with_allow_header() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/things",
            RouteOptions::default(),
            EndpointSet::new()
                .get(EndpointDef::handler(|_ctx| async {
                    Ok(HandlerOutcome::Value(json!([])))
                }))
                .post(EndpointDef::handler(|_ctx| async {
                    Ok(HandlerOutcome::Value(json!({"created": true})))
                })),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    let res = client
        .put(format!("{}/api/things", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        res.headers().get("allow").unwrap(),
        &HeaderValue::from_static("GET, POST, OPTIONS")
    );

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "API endpoint does not exist");

    shutdown.trigger();
}

#[tokio::test]
async fn test_role_gate_rejects_non_admin_with_403() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/things/{id}",
            RouteOptions::default(),
            EndpointSet::new().delete(EndpointDef::Configured {
                action: route_gate::routing::action(|_ctx| async {
                    Ok(HandlerOutcome::Value(json!({"deleted": true})))
                }),
                auth_required: None,
                role_required: Some(vec!["admin".into()]),
                scope_required: None,
            }),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    // Authenticated, but only a plain user.
    let res = client
        .delete(format!("{}/api/things/7", base))
        .header("authorization", "Bearer user-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // The admin passes both gates.
    let res = client
        .delete(format!("{}/api/things/7", base))
        .header("authorization", "Bearer admin-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
}

#[tokio::test]
async fn test_handler_sees_params_query_and_body() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/echo/{name}",
            RouteOptions::default(),
            EndpointSet::new().post(EndpointDef::handler(|ctx| async move {
                Ok(HandlerOutcome::Value(json!({
                    "name": ctx.params.get("name"),
                    "verbose": ctx.query.get("verbose"),
                    "body": ctx.body,
                })))
            })),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    let res = client
        .post(format!("{}/api/echo/gadget?verbose=1", base))
        .json(&json!({"k": "v"}))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "gadget");
    assert_eq!(body["verbose"], "1");
    assert_eq!(body["body"]["k"], "v");

    shutdown.trigger();
}

#[tokio::test]
async fn test_descriptor_controls_status_and_headers() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/things",
            RouteOptions::default(),
            EndpointSet::new().post(EndpointDef::handler(|_ctx| async {
                Ok(HandlerOutcome::Descriptor(
                    ResponseDescriptor::new(json!({"id": 7}))
                        .with_status(StatusCode::CREATED)
                        .with_header(
                            axum::http::header::LOCATION,
                            HeaderValue::from_static("/api/things/7"),
                        ),
                ))
            })),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    let res = client
        .post(format!("{}/api/things", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers().get("location").unwrap(), "/api/things/7");

    shutdown.trigger();
}

#[tokio::test]
async fn test_null_result_is_a_contract_violation() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/broken",
            RouteOptions::default(),
            EndpointSet::new().get(EndpointDef::handler(|_ctx| async {
                Ok(HandlerOutcome::Value(Value::Null))
            })),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/broken", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "internal server error");

    shutdown.trigger();
}

#[tokio::test]
async fn test_action_error_surfaces_as_500() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/flaky",
            RouteOptions::default(),
            EndpointSet::new().get(EndpointDef::handler(|_ctx| async {
                Err("backing store unavailable".into())
            })),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/flaky", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    shutdown.trigger();
}

#[tokio::test]
async fn test_root_flag_mounts_outside_api_path() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/status",
            RouteOptions {
                root: true,
                ..Default::default()
            },
            EndpointSet::new().get(EndpointDef::handler(|_ctx| async {
                Ok(HandlerOutcome::Value(json!({"status": "ok"})))
            })),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    let res = client.get(format!("{}/status", base)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Nothing mounted under the API path.
    let res = client
        .get(format!("{}/api/status", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/widgets",
            RouteOptions::default(),
            EndpointSet::new().get(EndpointDef::handler(|_ctx| async {
                Ok(HandlerOutcome::Value(json!({})))
            })),
        )
        .unwrap();

    let (base, shutdown) = common::start_gate(registry).await;
    let client = common::client();

    let res = client
        .get(format!("{}/api/widgets", base))
        .send()
        .await
        .unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    shutdown.trigger();
}
