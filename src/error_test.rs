use super::*;

#[derive(Debug, thiserror::Error)]
#[error("not found: {0}")]
struct NotFound(String);

impl ErrorCode for NotFound {
    fn error_code(&self) -> &'static str {
        "E_NOT_FOUND"
    }
}

#[derive(Debug, thiserror::Error)]
#[error("upstream busy")]
struct Busy;

impl ErrorCode for Busy {
    fn error_code(&self) -> &'static str {
        "E_BUSY"
    }

    fn retryable(&self) -> bool {
        true
    }
}

#[test]
fn from_error_copies_code_and_message() {
    let err = ApiError::from_error(StatusCode::NOT_FOUND, &NotFound("order".into()));
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.code, "E_NOT_FOUND");
    assert_eq!(err.message, "not found: order");
    assert!(!err.retryable);
}

#[test]
fn retryable_flag_is_carried() {
    let err = ApiError::from_error(StatusCode::SERVICE_UNAVAILABLE, &Busy);
    assert!(err.retryable);
}

#[test]
fn body_omits_status() {
    let body = serde_json::to_value(ApiError::unauthorized("missing role")).unwrap();
    assert_eq!(body["code"], "E_UNAUTHORIZED");
    assert_eq!(body["message"], "missing role");
    assert!(body.get("status").is_none());
}

#[tokio::test]
async fn into_response_uses_status() {
    let resp = ApiError::bad_request("nope").into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
