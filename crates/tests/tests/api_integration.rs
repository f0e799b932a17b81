use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use policy_extractor::{ScriptedClient, UpstreamError};
use policy_tests::{app_with, process_request, send_json};
use serde_json::json;
use tower::ServiceExt;

const TWO_ATOM_REPLY: &str = r#"{"policies":[{"display_text":"Unmarried couples not allowed without valid ID.","category":"couple_restriction","sensitivity":"critical","confidence":0.95},{"display_text":"Extra bed at INR 500/night.","category":"extra_bed","sensitivity":"standard","confidence":0.9}]}"#;

#[tokio::test]
async fn index_serves_the_policy_tool_page() {
    let app = app_with(ScriptedClient::replying("{}"), None);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(response.headers().get("x-request-id").is_some());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Hotel Policy Structuring Tool"));
}

#[tokio::test]
async fn extracts_couple_restriction_and_extra_bed() {
    let client = ScriptedClient::replying(TWO_ATOM_REPLY);
    let app = app_with(client.clone(), None);

    let (status, body) = send_json(
        app,
        process_request(json!({
            "policy_text": "No unmarried couples allowed without ID. Extra bed INR 500/night.",
            "api_key": "sk-ant-test"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::from_str::<serde_json::Value>(TWO_ATOM_REPLY).unwrap());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn placeholder_text_returns_empty_policy_list() {
    let app = app_with(ScriptedClient::replying(r#"{"policies":[]}"#), Some("env-key"));

    let (status, body) = send_json(app, process_request(json!({ "policy_text": "." }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "policies": [] }));
}

#[tokio::test]
async fn blank_text_is_a_bad_request_without_upstream_call() {
    let client = ScriptedClient::replying(r#"{"policies":[]}"#);
    let app = app_with(client.clone(), Some("env-key"));

    let (status, body) =
        send_json(app, process_request(json!({ "policy_text": "   \n  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No policy text provided." }));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn missing_key_is_a_bad_request_without_upstream_call() {
    let client = ScriptedClient::replying(r#"{"policies":[]}"#);
    let app = app_with(client.clone(), None);

    let (status, body) = send_json(
        app,
        process_request(json!({ "policy_text": "Pets allowed.", "api_key": null })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No Anthropic API key provided." }));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn missing_key_is_reported_before_blank_text() {
    let client = ScriptedClient::replying(r#"{"policies":[]}"#);
    let app = app_with(client.clone(), None);

    let (status, body) = send_json(app, process_request(json!({ "policy_text": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No Anthropic API key provided." }));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn oversized_body_is_rejected_with_json_error() {
    let client = ScriptedClient::replying(r#"{"policies":[]}"#);
    let app = app_with(client.clone(), Some("env-key"));

    let policy_text = "a".repeat(1024 * 1024 + 10);
    let (status, body) =
        send_json(app, process_request(json!({ "policy_text": policy_text }))).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Request body too large"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn environment_key_is_used_when_request_omits_one() {
    let client = ScriptedClient::replying(r#"{"policies":[]}"#);
    let app = app_with(client.clone(), Some("env-key"));

    let (status, _) =
        send_json(app, process_request(json!({ "policy_text": "Pets allowed." }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(client.last_request().unwrap().api_key, "env-key");
}

#[tokio::test]
async fn invalid_model_json_is_a_server_error_after_one_call() {
    let client = ScriptedClient::replying("```json\n{\"policies\": [\n```");
    let app = app_with(client.clone(), Some("env-key"));

    let (status, body) =
        send_json(app, process_request(json!({ "policy_text": "Pool closed." }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Failed to parse Claude response as JSON: "));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn upstream_failure_is_a_server_error() {
    let client = ScriptedClient::failing(UpstreamError::Status {
        status: 401,
        message: "authentication_error: invalid x-api-key".to_string(),
    });
    let app = app_with(client.clone(), None);

    let (status, body) = send_json(
        app,
        process_request(json!({ "policy_text": "Pets allowed.", "api_key": "bad" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Claude API error: status 401: authentication_error: invalid x-api-key" })
    );
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn body_is_parsed_as_json_without_content_type() {
    let client = ScriptedClient::replying(r#"[{"display_text":"Smoking only in designated areas."}]"#);
    let app = app_with(client, Some("env-key"));

    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .body(Body::from(json!({ "policy_text": "No smoking" }).to_string()))
        .unwrap();
    let (status, body) = send_json(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "policies": [{ "display_text": "Smoking only in designated areas." }] })
    );
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let client = ScriptedClient::replying(r#"{"policies":[]}"#);
    let app = app_with(client.clone(), Some("env-key"));

    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .header("content-type", "application/json")
        .body(Body::from("policy_text=hello"))
        .unwrap();
    let (status, body) = send_json(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn health_reports_counters() {
    let app = app_with(ScriptedClient::replying(TWO_ATOM_REPLY), Some("env-key"));

    let (status, _) = send_json(
        app.clone(),
        process_request(json!({ "policy_text": "Couples with ID only. Extra bed 500." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, health) = send_json(
        app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["default_api_key_configured"], true);
    assert_eq!(health["metrics"]["requests_total"], 1);
    assert_eq!(health["metrics"]["atoms_extracted_total"], 2);
}
