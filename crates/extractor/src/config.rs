use std::env;
use std::fs;

use anyhow::{Context, Result};
use policy_core::SYSTEM_PROMPT;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Everything an extraction call needs that does not come from the request.
/// Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub system_prompt: String,
    pub default_api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            default_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ExtractorConfig {
    pub fn from_env() -> Result<Self> {
        let system_prompt = match non_empty_env("POLICY_DESK_PROMPT_PATH") {
            Some(path) => fs::read_to_string(&path)
                .with_context(|| format!("failed to read prompt override {path}"))?,
            None => SYSTEM_PROMPT.to_string(),
        };

        Ok(Self {
            system_prompt,
            default_api_key: non_empty_env("ANTHROPIC_API_KEY"),
            model: non_empty_env("POLICY_DESK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: non_empty_env("POLICY_DESK_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            ..Self::default()
        })
    }

    pub fn with_default_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.default_api_key = Some(api_key.into()).filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// A non-blank key from the request wins; otherwise the configured default.
    pub fn resolve_api_key(&self, request_key: Option<&str>) -> Option<String> {
        request_key
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.default_api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
