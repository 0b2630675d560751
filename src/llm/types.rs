//! LLM types: provider-neutral request/response types and errors.
//!
//! Shared by the Gemini, `OpenAI`, and Anthropic clients. Every request is a
//! single user turn of text and inline media, optionally constrained to a
//! JSON response schema.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider answered but produced no text.
    #[error("empty response from model")]
    EmptyResponse,

    /// The call did not finish within the configured bound.
    #[error("model call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
            Self::Timeout { .. } => "E_LLM_TIMEOUT",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ApiRequest(_) | Self::Timeout { .. } | Self::ApiResponse { status: 429 | 500..=599, .. }
        )
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// Which configured model a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Fast multimodal model for image/video classification.
    Vision,
    /// Stronger reasoning model for conversation.
    Chat,
}

/// One piece of the user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Base64 payload without any `data:` prefix.
    InlineMedia { mime_type: String, data: String },
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub tier: ModelTier,
    pub system: Option<String>,
    pub parts: Vec<Part>,
    /// JSON Schema (lowercase type names) the reply must satisfy.
    pub response_schema: Option<serde_json::Value>,
    pub max_tokens: u32,
}

impl GenerateRequest {
    #[must_use]
    pub fn new(tier: ModelTier) -> Self {
        Self { tier, system: None, parts: Vec::new(), response_schema: None, max_tokens: 1024 }
    }

    #[must_use]
    pub fn with_media(mut self, mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.parts
            .push(Part::InlineMedia { mime_type: mime_type.into(), data: data.into() });
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Concatenated text parts, for providers that take a single prompt string.
    #[must_use]
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::InlineMedia { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Response from an LLM generate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// LLM GENERATE TRAIT
// =============================================================================

/// Provider-neutral async trait for LLM generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmGenerate: Send + Sync {
    /// Send one generate request to the provider.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the response is malformed,
    /// or the model returns no text.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError>;
}

// =============================================================================
// REPLY CLEANUP
// =============================================================================

/// Strip a surrounding markdown code fence (```` ```json ```` or ```` ``` ````).
#[must_use]
pub fn clean_json_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    let body = body.trim_start();
    body.strip_suffix("```").unwrap_or(body).trim_end()
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
