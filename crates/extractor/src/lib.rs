pub mod client;
pub mod config;
#[cfg(any(test, feature = "test-support"))]
pub mod stub;

use std::sync::Arc;
use std::time::Instant;

use policy_core::{
    audit_atoms, build_user_message, parse_policies, preview, ExtractionError, PolicyAtom,
    ProcessRequest,
};
use policy_observability::AppMetrics;
use serde_json::Value;
use tracing::{info, instrument, warn};

pub use client::{AnthropicClient, CompletionClient, CompletionRequest, UpstreamError};
pub use config::ExtractorConfig;
#[cfg(any(test, feature = "test-support"))]
pub use stub::ScriptedClient;

const RAW_PREVIEW_GRAPHEMES: usize = 200;
const ATOM_PREVIEW_GRAPHEMES: usize = 70;

/// Runs one policy blob through validation, a single model call and reply
/// parsing. Holds no per-request state.
pub struct PolicyExtractor<C> {
    client: Arc<C>,
    config: Arc<ExtractorConfig>,
    metrics: Arc<AppMetrics>,
}

impl<C> Clone for PolicyExtractor<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<C: CompletionClient> PolicyExtractor<C> {
    pub fn new(client: C, config: ExtractorConfig, metrics: Arc<AppMetrics>) -> Self {
        Self {
            client: Arc::new(client),
            config: Arc::new(config),
            metrics,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    pub async fn extract(&self, request: ProcessRequest) -> Result<Vec<Value>, ExtractionError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let result = self.run(request).await;
        self.metrics.observe_latency(started.elapsed());

        match &result {
            Ok(policies) => self.metrics.add_atoms(policies.len()),
            Err(ExtractionError::MissingApiKey | ExtractionError::EmptyInput) => {
                self.metrics.inc_rejected()
            }
            Err(ExtractionError::Upstream(_)) => self.metrics.inc_upstream_failure(),
            Err(ExtractionError::ResponseParse(_)) => self.metrics.inc_parse_failure(),
            Err(ExtractionError::Internal(_)) => self.metrics.inc_internal_failure(),
        }
        if let Err(error) = &result {
            warn!(kind = error.kind(), error = %error, "policy extraction failed");
        }

        result
    }

    async fn run(&self, request: ProcessRequest) -> Result<Vec<Value>, ExtractionError> {
        let policy_text = request.policy_text.as_deref().unwrap_or_default().trim();
        let api_key = self
            .config
            .resolve_api_key(request.api_key.as_deref())
            .ok_or(ExtractionError::MissingApiKey)?;
        if policy_text.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        info!(chars = policy_text.chars().count(), "processing policy text");

        let completion = CompletionRequest {
            api_key,
            model: self.config.model.clone(),
            system: self.config.system_prompt.clone(),
            user_message: build_user_message(policy_text),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let raw = self
            .client
            .complete(&completion)
            .await
            .map_err(upstream_to_extraction)?;
        info!(
            chars = raw.chars().count(),
            preview = %preview(&raw, RAW_PREVIEW_GRAPHEMES),
            "raw model response"
        );

        let policies = parse_policies(&raw)?;
        self.log_atoms(&policies);

        Ok(policies)
    }

    fn log_atoms(&self, policies: &[Value]) {
        info!(atoms = policies.len(), "extracted policy atoms");
        for atom in policies {
            match PolicyAtom::from_value(atom) {
                Some(typed) => info!(
                    tag = typed.sensitivity.tag(),
                    category = typed.category.as_slug(),
                    text = %preview(&typed.display_text, ATOM_PREVIEW_GRAPHEMES),
                    "atom"
                ),
                None => info!(
                    atom = %preview(&atom.to_string(), ATOM_PREVIEW_GRAPHEMES),
                    "untyped atom"
                ),
            }
        }

        let audits = audit_atoms(policies);
        let warnings: usize = audits.iter().map(|audit| audit.anomalies.len()).sum();
        for audit in &audits {
            for anomaly in &audit.anomalies {
                warn!(index = audit.index, anomaly = %anomaly.describe(), "atom failed audit");
            }
        }
        if warnings > 0 {
            self.metrics.add_audit_warnings(warnings);
        }
    }
}

fn upstream_to_extraction(error: UpstreamError) -> ExtractionError {
    match error {
        UpstreamError::EmptyContent => {
            ExtractionError::Internal("Claude response contained no text content".to_string())
        }
        other => ExtractionError::Upstream(other.to_string()),
    }
}
