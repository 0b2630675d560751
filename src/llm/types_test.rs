use super::*;
use crate::error::ErrorCode;

// =============================================================================
// LlmError::error_code
// =============================================================================

#[test]
fn error_code_config_parse() {
    let err = LlmError::ConfigParse("bad".into());
    assert_eq!(err.error_code(), "E_CONFIG_PARSE");
}

#[test]
fn error_code_missing_api_key() {
    let err = LlmError::MissingApiKey { var: "KEY".into() };
    assert_eq!(err.error_code(), "E_MISSING_API_KEY");
}

#[test]
fn error_code_empty_and_timeout() {
    assert_eq!(LlmError::EmptyResponse.error_code(), "E_EMPTY_RESPONSE");
    assert_eq!(LlmError::Timeout { secs: 30 }.error_code(), "E_LLM_TIMEOUT");
}

// =============================================================================
// LlmError::retryable
// =============================================================================

#[test]
fn retryable_api_request() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
}

#[test]
fn retryable_api_response_429_and_5xx() {
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
}

#[test]
fn retryable_timeout() {
    assert!(LlmError::Timeout { secs: 1 }.retryable());
}

#[test]
fn not_retryable_client_errors() {
    assert!(!LlmError::ApiResponse { status: 400, body: String::new() }.retryable());
    assert!(!LlmError::ApiParse("json".into()).retryable());
    assert!(!LlmError::EmptyResponse.retryable());
    assert!(!LlmError::MissingApiKey { var: "K".into() }.retryable());
}

// =============================================================================
// clean_json_fences
// =============================================================================

#[test]
fn fences_json_tagged() {
    assert_eq!(clean_json_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
}

#[test]
fn fences_bare() {
    assert_eq!(clean_json_fences("  ```\n{\"a\":1}```  "), "{\"a\":1}");
}

#[test]
fn fences_absent() {
    assert_eq!(clean_json_fences("  {\"a\":1}\n"), "{\"a\":1}");
}

#[test]
fn fences_unterminated() {
    assert_eq!(clean_json_fences("```json {\"a\":1}"), "{\"a\":1}");
}

// =============================================================================
// GenerateRequest
// =============================================================================

#[test]
fn request_builder_collects_parts() {
    let req = GenerateRequest::new(ModelTier::Vision)
        .with_media("image/png", "AAAA")
        .with_text("first")
        .with_text("second");
    assert_eq!(req.parts.len(), 3);
    assert_eq!(req.prompt_text(), "first\nsecond");
    assert!(req.response_schema.is_none());
}
