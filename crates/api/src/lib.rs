use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use policy_core::{ErrorResponse, ExtractionError, PoliciesResponse, ProcessRequest};
use policy_extractor::{AnthropicClient, CompletionClient, ExtractorConfig, PolicyExtractor};
use policy_observability::{AppMetrics, MetricsSnapshot};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub const DEFAULT_BIND: &str = "127.0.0.1:5111";
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
const POLICY_TOOL_HTML: &str = include_str!("../static/policy_tool.html");

pub struct ApiState<C> {
    pub extractor: PolicyExtractor<C>,
    pub metrics: Arc<AppMetrics>,
}

impl<C> Clone for ApiState<C> {
    fn clone(&self) -> Self {
        Self {
            extractor: self.extractor.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<C: CompletionClient> ApiState<C> {
    pub fn new(client: C, config: ExtractorConfig) -> Self {
        let metrics = AppMetrics::shared();
        Self {
            extractor: PolicyExtractor::new(client, config, metrics.clone()),
            metrics,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    model: String,
    default_api_key_configured: bool,
    metrics: MetricsSnapshot,
}

/// Production app: configuration from the environment, Anthropic over HTTPS.
pub fn build_app() -> Result<Router> {
    let config = ExtractorConfig::from_env().context("failed to load extractor config")?;
    let client = AnthropicClient::new(config.api_base.clone())?;
    Ok(build_router(ApiState::new(client, config)))
}

pub fn build_router<C: CompletionClient>(state: ApiState<C>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/process", post(process::<C>))
        .route("/health", get(health::<C>))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(middleware::map_response(json_payload_too_large))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(POLICY_TOOL_HTML)
}

/// Body is read as JSON whatever the declared content type.
async fn process<C: CompletionClient>(State(state): State<ApiState<C>>, body: Bytes) -> Response {
    let request: ProcessRequest = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(error) => {
            return error_body(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {error}"));
        }
    };

    match state.extractor.extract(request).await {
        Ok(policies) => (StatusCode::OK, Json(PoliciesResponse { policies })).into_response(),
        Err(error) => extraction_error_response(&error),
    }
}

async fn health<C: CompletionClient>(State(state): State<ApiState<C>>) -> impl IntoResponse {
    let config = state.extractor.config();
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        model: config.model.clone(),
        default_api_key_configured: config.default_api_key.is_some(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

fn extraction_error_response(error: &ExtractionError) -> Response {
    let status = if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_body(status, error.to_string())
}

fn error_body(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// The body limit answers 413 with plain text; the page only reads JSON.
async fn json_payload_too_large(response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    error_body(
        StatusCode::PAYLOAD_TOO_LARGE,
        format!(
            "Request body too large; the limit is {} KiB.",
            MAX_REQUEST_BODY_BYTES / 1024
        ),
    )
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("no-referrer"),
    );
    // The bundled page carries its script and styles inline.
    response.headers_mut().insert(
        header::HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; frame-ancestors 'none'; base-uri 'none'",
        ),
    );

    response
}
