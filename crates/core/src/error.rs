use thiserror::Error;

/// Every way a single extraction request can end without a policy list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("No Anthropic API key provided.")]
    MissingApiKey,
    #[error("No policy text provided.")]
    EmptyInput,
    #[error("Claude API error: {0}")]
    Upstream(String),
    #[error("Failed to parse Claude response as JSON: {0}")]
    ResponseParse(String),
    #[error("{0}")]
    Internal(String),
}

impl ExtractionError {
    /// Caller-side faults: the request itself must change before it can succeed.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::EmptyInput)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "missing_api_key",
            Self::EmptyInput => "empty_input",
            Self::Upstream(_) => "upstream_api_error",
            Self::ResponseParse(_) => "response_parse_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(error: serde_json::Error) -> Self {
        Self::ResponseParse(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_wire_contract() {
        assert_eq!(
            ExtractionError::MissingApiKey.to_string(),
            "No Anthropic API key provided."
        );
        assert_eq!(
            ExtractionError::Upstream("401 invalid x-api-key".to_string()).to_string(),
            "Claude API error: 401 invalid x-api-key"
        );
        assert!(ExtractionError::EmptyInput.is_client_error());
        assert!(!ExtractionError::Internal("boom".to_string()).is_client_error());
    }
}
