//! LLM: multi-provider adapter for classification and the copilot.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The `LlmClient` enum dispatches to
//! Gemini, `OpenAI`, or Anthropic based on `LLM_PROVIDER`, and picks the
//! vision or chat model from the request's [`types::ModelTier`].

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod openai;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::LlmGenerate;
use types::{GenerateRequest, GenerateResponse, LlmError, ModelTier};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to one configured provider.
pub struct LlmClient {
    inner: LlmProvider,
    vision_model: String,
    chat_model: String,
}

enum LlmProvider {
    Gemini(gemini::GeminiClient),
    OpenAi(openai::OpenAiClient),
    Anthropic(anthropic::AnthropicClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = match config.provider {
            LlmProviderKind::Gemini => {
                LlmProvider::Gemini(gemini::GeminiClient::new(config.api_key, config.base_url, config.timeouts)?)
            }
            LlmProviderKind::OpenAi => {
                LlmProvider::OpenAi(openai::OpenAiClient::new(config.api_key, config.base_url, config.timeouts)?)
            }
            LlmProviderKind::Anthropic => LlmProvider::Anthropic(anthropic::AnthropicClient::new(
                config.api_key,
                config.base_url,
                config.timeouts,
            )?),
        };
        Ok(Self { inner, vision_model: config.vision_model, chat_model: config.chat_model })
    }

    /// Model name used for a tier.
    #[must_use]
    pub fn model(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Vision => &self.vision_model,
            ModelTier::Chat => &self.chat_model,
        }
    }
}

#[async_trait::async_trait]
impl LlmGenerate for LlmClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let model = self.model(request.tier);
        match &self.inner {
            LlmProvider::Gemini(c) => c.generate(model, request).await,
            LlmProvider::OpenAi(c) => c.generate(model, request).await,
            LlmProvider::Anthropic(c) => c.generate(model, request).await,
        }
    }
}
