use super::*;
use crate::llm::types::ModelTier;
use crate::state::test_helpers::{self, MockLlm};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize, PartialEq)]
struct Reply {
    answer: String,
}

fn request() -> GenerateRequest {
    GenerateRequest::new(ModelTier::Chat).with_text("hello")
}

// =============================================================================
// split_data_url / decode_reply
// =============================================================================

#[test]
fn split_data_url_extracts_mime_and_payload() {
    assert_eq!(split_data_url("data:image/png;base64,AAAA"), (Some("image/png"), "AAAA"));
}

#[test]
fn split_data_url_passes_raw_base64_through() {
    assert_eq!(split_data_url("AAAA"), (None, "AAAA"));
}

#[test]
fn split_data_url_strips_unknown_prefix() {
    assert_eq!(split_data_url("garbage,BBBB"), (None, "BBBB"));
}

#[test]
fn decode_reply_strips_fences() {
    let reply: Reply = decode_reply("```json\n{\"answer\":\"ok\"}\n```").unwrap();
    assert_eq!(reply.answer, "ok");
}

#[test]
fn decode_reply_rejects_malformed_json() {
    let err = decode_reply::<Reply>("not json").unwrap_err();
    assert!(matches!(err, AiError::Decode(_)));
    assert_eq!(err.error_code(), "E_AI_DECODE");
}

// =============================================================================
// generate
// =============================================================================

#[tokio::test]
async fn generate_without_llm_is_not_configured() {
    let state = test_helpers::test_app_state();
    let err = generate(&state, Uuid::new_v4(), &request()).await.unwrap_err();
    assert!(matches!(err, AiError::LlmNotConfigured));
}

#[tokio::test]
async fn generate_json_decodes_reply() {
    let mock = Arc::new(MockLlm::replying(r#"{"answer":"hi"}"#));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let reply: Reply = generate_json(&state, Uuid::new_v4(), &request()).await.unwrap();
    assert_eq!(reply, Reply { answer: "hi".into() });
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn retryable_error_is_retried_once() {
    let mock = Arc::new(MockLlm::new(vec![
        Err(LlmError::ApiResponse { status: 503, body: "overloaded".into() }),
        Ok(r#"{"answer":"second"}"#.into()),
    ]));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let reply: Reply = generate_json(&state, Uuid::new_v4(), &request()).await.unwrap();
    assert_eq!(reply.answer, "second");
    assert_eq!(mock.calls(), 2);
}

#[tokio::test]
async fn non_retryable_error_is_not_retried() {
    let mock = Arc::new(MockLlm::new(vec![
        Err(LlmError::ApiResponse { status: 400, body: "bad".into() }),
        Ok(r#"{"answer":"never"}"#.into()),
    ]));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let err = generate(&state, Uuid::new_v4(), &request()).await.unwrap_err();
    assert!(matches!(err, AiError::Llm(LlmError::ApiResponse { status: 400, .. })));
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn attempts_stop_at_max_attempts() {
    let mock = Arc::new(MockLlm::new(vec![
        Err(LlmError::ApiRequest("reset".into())),
        Err(LlmError::ApiRequest("reset".into())),
        Ok(r#"{"answer":"too late"}"#.into()),
    ]));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let err = generate(&state, Uuid::new_v4(), &request()).await.unwrap_err();
    assert!(err.retryable());
    assert_eq!(mock.calls(), 2);
}

#[tokio::test]
async fn slow_model_times_out() {
    let mock = Arc::new(MockLlm::replying(r#"{"answer":"slow"}"#).with_delay(Duration::from_secs(5)));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let err = generate(&state, Uuid::new_v4(), &request()).await.unwrap_err();
    assert!(matches!(err, AiError::Llm(LlmError::Timeout { .. })));
}

#[tokio::test]
async fn per_actor_limit_short_circuits_before_model() {
    let mock = Arc::new(MockLlm::new(Vec::new()));
    let mut config = test_helpers::test_config();
    config.rate_limit.per_client_limit = 1;
    let state = crate::state::AppState::new(config, Some(mock.clone()));
    let actor = Uuid::new_v4();

    let _ = generate(&state, actor, &request()).await;
    let err = generate(&state, actor, &request()).await.unwrap_err();
    assert!(matches!(err, AiError::RateLimited(_)));
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn retries_count_against_global_window() {
    let mock = Arc::new(MockLlm::new(vec![
        Err(LlmError::ApiResponse { status: 503, body: "overloaded".into() }),
        Ok(r#"{"answer":"second"}"#.into()),
    ]));
    let mut config = test_helpers::test_config();
    config.rate_limit.global_limit = 1;
    let state = crate::state::AppState::new(config, Some(mock.clone()));

    let err = generate(&state, Uuid::new_v4(), &request()).await.unwrap_err();
    assert!(matches!(err, AiError::RateLimited(RateLimitError::GlobalExceeded { limit: 1, .. })));
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn retried_call_uses_two_global_slots() {
    let mock = Arc::new(MockLlm::new(vec![
        Err(LlmError::ApiResponse { status: 503, body: "overloaded".into() }),
        Ok(r#"{"answer":"second"}"#.into()),
    ]));
    let mut config = test_helpers::test_config();
    config.rate_limit.global_limit = 2;
    let state = crate::state::AppState::new(config, Some(mock.clone()));

    let reply: Reply = generate_json(&state, Uuid::new_v4(), &request()).await.unwrap();
    assert_eq!(reply.answer, "second");
    assert!(matches!(
        state.rate_limiter.check_and_record(Uuid::new_v4()),
        Err(RateLimitError::GlobalExceeded { .. })
    ));
}
