//! HTTP API integration tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

mod common;

use axum::http::{Request, StatusCode};
use serde_json::json;
use std::time::{Duration, Instant};

use schoolfinder::registry::SchoolRegistry;

use common::{demo_router, get, post_json, post_raw, send, test_server, test_server_with_latency};

// ============================================================================
// Geocode
// ============================================================================

#[tokio::test]
async fn test_geocode_known_place() {
    let router = demo_router();
    let (status, body) = send(&router, get("/geocode?address=I%20live%20in%20San%20Francisco")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "latitude": 37.7749, "longitude": -122.4194 }));
}

#[tokio::test]
async fn test_geocode_fallback_near_default() {
    let router = demo_router();
    let (status, body) = send(&router, get("/geocode?address=nowhereland")).await;

    assert_eq!(status, StatusCode::OK);
    let latitude = body["latitude"].as_f64().unwrap();
    let longitude = body["longitude"].as_f64().unwrap();
    assert!((latitude - 40.7128).abs() <= 0.05 + 1e-9);
    assert!((longitude - -74.0060).abs() <= 0.05 + 1e-9);
}

#[tokio::test]
async fn test_geocode_seeded_fallback_is_reproducible() {
    let (_, first) = send(&demo_router(), get("/geocode?address=atlantis")).await;
    let (_, second) = send(&demo_router(), get("/geocode?address=atlantis")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_geocode_missing_address() {
    let router = demo_router();

    let (status, body) = send(&router, get("/geocode")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Address parameter is required");

    let (status, _) = send(&router, get("/geocode?address=%20%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// List schools
// ============================================================================

#[tokio::test]
async fn test_list_schools_sorted_by_distance() {
    let router = demo_router();
    let (status, body) = send(&router, get("/schools?latitude=40.7128&longitude=-74.006")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 5);

    let schools = body["schools"].as_array().unwrap();
    assert_eq!(schools.len(), 5);
    assert_eq!(schools[0]["name"], "Central High School");
    assert_eq!(schools[0]["distance"], 0.0);

    let distances: Vec<f64> = schools
        .iter()
        .map(|s| s["distance"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_list_schools_empty_registry() {
    let router = test_server(SchoolRegistry::new()).build_router();
    let (status, body) = send(&router, get("/schools?latitude=0&longitude=0")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["schools"], json!([]));
}

#[tokio::test]
async fn test_list_schools_missing_coordinate() {
    let router = demo_router();

    let (status, body) = send(&router, get("/schools?latitude=40.7")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "longitude is required");

    let (status, body) = send(&router, get("/schools")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "latitude is required");
}

#[tokio::test]
async fn test_list_schools_invalid_coordinate() {
    let router = demo_router();

    let (status, body) = send(&router, get("/schools?latitude=north&longitude=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("latitude must be a number"));

    let (status, body) = send(&router, get("/schools?latitude=200&longitude=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Latitude must be"));
}

// ============================================================================
// Add school
// ============================================================================

#[tokio::test]
async fn test_add_school_then_list() {
    let router = demo_router();

    let (status, body) = send(
        &router,
        post_json(
            "/schools",
            &json!({
                "name": "Harbor Prep",
                "address": "1 Pier Rd",
                "latitude": 40.7,
                "longitude": -74.01
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "message": "School added successfully", "schoolId": 6 })
    );

    let (_, body) = send(&router, get("/schools?latitude=40.7&longitude=-74.01")).await;
    assert_eq!(body["count"], 6);
    assert_eq!(body["schools"][0]["name"], "Harbor Prep");
    assert_eq!(body["schools"][0]["id"], 6);
}

#[tokio::test]
async fn test_add_school_accepts_numeric_strings_and_zero() {
    let router = test_server(SchoolRegistry::new()).build_router();

    let (status, body) = send(
        &router,
        post_json(
            "/schools",
            &json!({ "name": "A", "address": "addr", "latitude": "0", "longitude": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schoolId"], 1);

    let (_, body) = send(
        &router,
        post_json(
            "/schools",
            &json!({ "name": "B", "address": "addr", "latitude": 0, "longitude": 0 }),
        ),
    )
    .await;
    assert_eq!(body["schoolId"], 2);
}

#[tokio::test]
async fn test_add_school_missing_field() {
    let router = demo_router();

    let (status, body) = send(
        &router,
        post_json("/schools", &json!({ "name": "", "address": "x", "latitude": 0, "longitude": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");

    let (status, body) = send(
        &router,
        post_json("/schools", &json!({ "name": "A", "address": "x", "latitude": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "longitude is required");
}

#[tokio::test]
async fn test_add_school_invalid_latitude() {
    let router = demo_router();

    let (status, body) = send(
        &router,
        post_json(
            "/schools",
            &json!({ "name": "A", "address": "x", "latitude": 200, "longitude": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Latitude must be"));

    let (_, body) = send(&router, get("/stats")).await;
    assert_eq!(body["total_schools"], 5);
}

#[tokio::test]
async fn test_add_school_malformed_body() {
    let router = demo_router();
    let (status, body) = send(&router, post_raw("/schools", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_concurrent_adds_get_unique_ids() {
    let router = test_server(SchoolRegistry::new()).build_router();

    let requests = (0..20).map(|i| {
        let router = router.clone();
        async move {
            let body = json!({ "name": format!("School {i}"), "address": "addr", "latitude": 1, "longitude": 1 });
            send(&router, post_json("/schools", &body)).await
        }
    });

    let mut ids: Vec<u64> = futures::future::join_all(requests)
        .await
        .into_iter()
        .map(|(status, body)| {
            assert_eq!(status, StatusCode::OK);
            body["schoolId"].as_u64().unwrap()
        })
        .collect();
    ids.sort_unstable();

    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_concurrent_adds_with_latency_overlap() {
    let router = test_server_with_latency(SchoolRegistry::new(), 50).build_router();
    let count: u64 = 10;

    let requests = (0..count).map(|i| {
        let router = router.clone();
        async move {
            let body = json!({ "name": format!("Slow {i}"), "address": "addr", "latitude": 2, "longitude": 2 });
            send(&router, post_json("/schools", &body)).await
        }
    });

    let started = Instant::now();
    let responses = futures::future::join_all(requests).await;
    let elapsed = started.elapsed();

    let mut ids: Vec<u64> = responses
        .into_iter()
        .map(|(status, body)| {
            assert_eq!(status, StatusCode::OK);
            body["schoolId"].as_u64().unwrap()
        })
        .collect();
    ids.sort_unstable();

    assert_eq!(ids, (1..=count).collect::<Vec<_>>());
    assert!(elapsed >= Duration::from_millis(50));
    // Sleeps run side by side; serialised they would take count * 50ms
    assert!(elapsed < Duration::from_millis(count * 50 / 2), "took {elapsed:?}");
}

// ============================================================================
// Service endpoints
// ============================================================================

#[tokio::test]
async fn test_api_prefix_aliases() {
    let router = demo_router();

    let (status, body) = send(&router, get("/api/schools?latitude=40.7&longitude=-74.0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);

    let (status, body) = send(&router, get("/api/geocode?address=Chicago")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["latitude"], 41.8781);
}

#[tokio::test]
async fn test_health_and_stats() {
    let router = demo_router();

    let (status, body) = send(&router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["schools"], 5);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = send(&router, get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_schools"], 5);
    assert_eq!(body["next_id"], 6);
}

#[tokio::test]
async fn test_stats_reports_closest_school() {
    let router = demo_router();

    let (status, body) = send(&router, get("/stats?latitude=40.69&longitude=-74.0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_schools"], 5);
    assert_eq!(body["closest"]["name"], "South Bay School");
    assert_eq!(body["closest"]["id"], 5);
    assert_eq!(body["closest"]["distance"], 0.0);

    let url = body["closest"]["directions_url"].as_str().unwrap();
    assert!(url.contains("destination=40.69,-74"));
    assert!(url.contains("origin=40.69,-74"));

    let (_, body) = send(&router, get("/stats")).await;
    assert!(body.get("closest").is_none());

    let (status, body) = send(&router, get("/stats?latitude=40.69")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "longitude is required");
}

#[tokio::test]
async fn test_stats_closest_on_empty_registry() {
    let router = test_server(SchoolRegistry::new()).build_router();
    let (status, body) = send(&router, get("/api/stats?latitude=0&longitude=0")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_schools"], 0);
    assert!(body.get("closest").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = send(&demo_router(), get("/teachers")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_header_when_enabled() {
    let router = demo_router();
    let request = Request::builder()
        .uri("/schools?latitude=0&longitude=0")
        .header("origin", "http://example.com")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
