use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One system + user message pair, fully resolved for a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub api_key: String,
    pub model: String,
    pub system: String,
    pub user_message: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("response body could not be decoded: {0}")]
    Decode(String),
    #[error("response contained no text content")]
    EmptyContent,
}

/// The only capability the extractor needs from a model provider.
pub trait CompletionClient: Send + Sync + 'static {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send;
}

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: Client,
    api_base: String,
}

impl AnthropicClient {
    pub fn new(api_base: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(600))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_base: api_base.into(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base.trim_end_matches('/'))
    }
}

impl CompletionClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.user_message,
            }],
        };

        let response = self
            .http
            .post(self.messages_url())
            .header("x-api-key", request.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: describe_error_body(response.text().await),
            });
        }

        let payload: MessagesResponse = response
            .json()
            .await
            .map_err(|err| UpstreamError::Decode(err.to_string()))?;

        first_text_block(payload.content).ok_or(UpstreamError::EmptyContent)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

fn first_text_block(blocks: Vec<ContentBlock>) -> Option<String> {
    blocks
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
}

fn describe_error_body<E: std::fmt::Display>(body: Result<String, E>) -> String {
    match body {
        Ok(text) => upstream_error_message(&text),
        Err(err) => format!("<failed to read response body: {err}>"),
    }
}

/// Pulls `error.type` / `error.message` out of an Anthropic error body, falling
/// back to the raw body when it is not the documented envelope.
fn upstream_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => match (error.kind, error.message) {
            (Some(kind), Some(message)) => format!("{kind}: {message}"),
            (None, Some(message)) => message,
            (Some(kind), None) => kind,
            (None, None) => body.trim().to_string(),
        },
        Err(_) if body.trim().is_empty() => "<empty response body>".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
