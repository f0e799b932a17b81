//! Shared fixtures for the end-to-end HTTP tests.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use policy_api::{build_router, ApiState};
use policy_extractor::{ExtractorConfig, ScriptedClient};
use serde_json::Value;
use tower::ServiceExt;

pub fn app_with(client: ScriptedClient, default_api_key: Option<&str>) -> Router {
    let mut config = ExtractorConfig::default();
    if let Some(key) = default_api_key {
        config = config.with_default_api_key(key);
    }
    build_router(ApiState::new(client, config))
}

pub fn process_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed = serde_json::from_slice(&body).unwrap();
    (status, parsed)
}
