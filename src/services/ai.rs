//! AI boundary: one bounded, retried, rate-limited model call.
//!
//! DESIGN
//! ======
//! Classification and the copilot both go through [`generate_json`]:
//! rate-limit check, token reservation, then up to `max_attempts` calls each
//! wrapped in `tokio::time::timeout`. Only retryable errors are retried, with
//! a linear backoff. The reply is fence-stripped and decoded strictly into
//! the caller's type, so out-of-set enum values fail here and the caller
//! substitutes its fallback.

use serde::de::DeserializeOwned;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::llm::types::{GenerateRequest, GenerateResponse, LlmError, clean_json_fences};
use crate::rate_limit::RateLimitError;
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("rate limited: {0}")]
    RateLimited(#[from] RateLimitError),
    #[error("model reply did not match schema: {0}")]
    Decode(String),
}

impl ErrorCode for AiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Llm(_) => "E_LLM_ERROR",
            Self::RateLimited(_) => "E_RATE_LIMITED",
            Self::Decode(_) => "E_AI_DECODE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.retryable(),
            Self::RateLimited(_) => true,
            Self::LlmNotConfigured | Self::Decode(_) => false,
        }
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Call the model and decode its JSON reply into `T`.
///
/// # Errors
///
/// Any failure along the way; callers at the AI boundary log it and fall back.
pub async fn generate_json<T: DeserializeOwned>(
    state: &AppState,
    actor_id: Uuid,
    request: &GenerateRequest,
) -> Result<T, AiError> {
    let response = generate(state, actor_id, request).await?;
    decode_reply(&response.text)
}

/// Call the model with rate limiting, token reservation, timeout, and retry.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted or a non-retryable
/// error occurs.
pub async fn generate(
    state: &AppState,
    actor_id: Uuid,
    request: &GenerateRequest,
) -> Result<GenerateResponse, AiError> {
    let Some(llm) = state.llm.as_ref() else {
        return Err(AiError::LlmNotConfigured);
    };
    let policy = state.config.ai;

    state.rate_limiter.check_and_record(actor_id)?;
    let reserved = u64::from(request.max_tokens);
    state
        .rate_limiter
        .reserve_token_budget(actor_id, reserved)?;

    let mut attempt = 0;
    loop {
        attempt += 1;
        let outcome = match tokio::time::timeout(policy.call_timeout, llm.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout { secs: policy.call_timeout.as_secs() }),
        };

        match outcome {
            Ok(response) => {
                state.rate_limiter.record_tokens(
                    actor_id,
                    response.input_tokens + response.output_tokens,
                    reserved,
                );
                info!(
                    %actor_id,
                    attempt,
                    model = %response.model,
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    "ai: model replied"
                );
                return Ok(response);
            }
            Err(e) if e.retryable() && attempt < policy.max_attempts => {
                warn!(%actor_id, attempt, error = %e, "ai: retryable model error");
                tokio::time::sleep(policy.retry_backoff * attempt).await;
                if let Err(limited) = state.rate_limiter.check_and_record_retry() {
                    warn!(%actor_id, attempt, "ai: retry blocked by global limit");
                    state
                        .rate_limiter
                        .release_reserved_tokens(actor_id, reserved);
                    return Err(limited.into());
                }
            }
            Err(e) => {
                state
                    .rate_limiter
                    .release_reserved_tokens(actor_id, reserved);
                return Err(e.into());
            }
        }
    }
}

/// Strip code fences and decode strictly.
///
/// # Errors
///
/// Returns [`AiError::Decode`] for malformed JSON or schema mismatches.
pub fn decode_reply<T: DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    serde_json::from_str(clean_json_fences(raw)).map_err(|e| AiError::Decode(e.to_string()))
}

/// Split a `data:<mime>;base64,<payload>` URL. Raw base64 passes through
/// with no mime.
#[must_use]
pub fn split_data_url(input: &str) -> (Option<&str>, &str) {
    let Some((prefix, payload)) = input.split_once(',') else {
        return (None, input);
    };
    let mime = prefix
        .strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .filter(|m| !m.is_empty());
    (mime, payload)
}

#[cfg(test)]
#[path = "ai_test.rs"]
mod tests;
