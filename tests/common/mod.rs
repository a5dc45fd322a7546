//! Common test utilities

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use schoolfinder::registry::SchoolRegistry;
use schoolfinder::server::{SchoolServer, ServerConfig};

/// Server with request logging off and a fixed geocoder seed
pub fn test_server(registry: SchoolRegistry) -> SchoolServer {
    test_server_with_latency(registry, 0)
}

/// Same as [`test_server`] with an artificial delay on list and add
pub fn test_server_with_latency(registry: SchoolRegistry, latency_ms: u64) -> SchoolServer {
    let config = ServerConfig::builder()
        .enable_request_logging(false)
        .geocode_seed(7)
        .simulated_latency_ms(latency_ms)
        .build()
        .unwrap();
    SchoolServer::with_registry(config, registry)
}

/// Router over the demo schools
pub fn demo_router() -> Router {
    test_server(SchoolRegistry::with_demo_data()).build_router()
}

/// Send a request and decode the JSON body (`Null` when empty)
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

pub fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}
