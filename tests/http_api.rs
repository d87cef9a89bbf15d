mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use trailhead::web;

fn token_for(sub: &str) -> String {
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(format!("{{\"sub\":\"{sub}\"}}"));
    format!("header.{payload}.signature")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn test_app() -> Router {
    web::api_router(common::test_pool().await)
}

fn hike_body(visibility: &str, capacity: i64) -> Value {
    json!({
        "title": "Ridge traverse",
        "location_name": "Grindelwald",
        "start_time": "2026-09-12T07:30:00Z",
        "intensity": "medium",
        "visibility": visibility,
        "capacity": capacity,
    })
}

#[tokio::test]
async fn guests_browse_writes_require_identity() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/hikes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, "POST", "/api/hikes", None, Some(hike_body("public", 5))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "not_authenticated");

    let (status, _) = send(&app, "GET", "/api/hikes/my", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_join_and_browse_roundtrip() {
    let app = test_app().await;
    let creator = token_for("u-creator");
    let friend = token_for("u-friend");

    let (status, hike) = send(
        &app,
        "POST",
        "/api/hikes",
        Some(&creator),
        Some(hike_body("public", 3)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(hike["member_count"], 1);
    assert_eq!(hike["is_admin"], true);
    assert_eq!(hike["is_member"], true);
    let hike_id = hike["hike_id"].as_str().unwrap();

    let detail_uri = format!("/api/hikes/{hike_id}");
    let (status, detail) = send(&app, "GET", &detail_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["is_admin"], false);
    assert_eq!(detail["join_request_status"], Value::Null);

    let membership_uri = format!("/api/hikes/{hike_id}/membership");
    let (status, body) = send(
        &app,
        "POST",
        &membership_uri,
        Some(&friend),
        Some(json!({ "action": "join" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "joined");

    let (status, body) = send(
        &app,
        "POST",
        &membership_uri,
        Some(&friend),
        Some(json!({ "action": "join" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "already_member");

    let (status, mine) = send(&app, "GET", "/api/hikes/my", Some(&friend), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["member_count"], 2);

    let (status, body) = send(
        &app,
        "POST",
        &membership_uri,
        Some(&friend),
        Some(json!({ "action": "dance" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn private_request_approval_over_http() {
    let app = test_app().await;
    let creator = token_for("u-creator");
    let hopeful = token_for("u-hopeful");

    let (_, hike) = send(
        &app,
        "POST",
        "/api/hikes",
        Some(&creator),
        Some(hike_body("private", 2)),
    )
    .await;
    let hike_id = hike["hike_id"].as_str().unwrap();

    let membership_uri = format!("/api/hikes/{hike_id}/membership");
    let (status, body) = send(
        &app,
        "POST",
        &membership_uri,
        Some(&hopeful),
        Some(json!({ "action": "join" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    // Outsiders cannot read the request queue.
    let requests_uri = format!("/api/hikes/{hike_id}/requests");
    let (status, body) = send(&app, "GET", &requests_uri, Some(&hopeful), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, requests) = send(&app, "GET", &requests_uri, Some(&creator), None).await;
    assert_eq!(status, StatusCode::OK);
    let request_id = requests[0]["request_id"].as_str().unwrap();
    assert_eq!(requests[0]["status"], "pending");

    let decision_uri = format!("/api/hikes/{hike_id}/requests/{request_id}");
    let (status, body) = send(
        &app,
        "POST",
        &decision_uri,
        Some(&hopeful),
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, decision) = send(
        &app,
        "POST",
        &decision_uri,
        Some(&creator),
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["request"]["status"], "approved");
    assert_eq!(decision["member_count"], 2);

    let (status, body) = send(
        &app,
        "POST",
        &decision_uri,
        Some(&creator),
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "request_already_resolved");

    // The new member now sees the hike in their detail view.
    let (status, detail) = send(
        &app,
        "GET",
        &format!("/api/hikes/{hike_id}"),
        Some(&hopeful),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["is_member"], true);
}

#[tokio::test]
async fn conflict_and_not_found_codes() {
    let app = test_app().await;
    let creator = token_for("u-creator");
    let walker = token_for("u-walker");

    let (status, body) = send(&app, "GET", "/api/hikes/no-such-hike", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "hike_not_found");

    let (_, hike) = send(
        &app,
        "POST",
        "/api/hikes",
        Some(&creator),
        Some(hike_body("public", 1)),
    )
    .await;
    let hike_id = hike["hike_id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/hikes/{hike_id}/membership"),
        Some(&walker),
        Some(json!({ "action": "join" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "capacity_exceeded");

    let (status, body) = send(
        &app,
        "POST",
        "/api/hikes",
        Some(&creator),
        Some(json!({
            "title": "Bad hike",
            "location_name": "Nowhere",
            "start_time": "2026-09-12T07:30:00Z",
            "capacity": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}
