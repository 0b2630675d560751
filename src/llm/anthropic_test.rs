use super::*;
use crate::llm::types::ModelTier;
use httpmock::prelude::*;
use serde_json::json;

fn make_response(content: serde_json::Value) -> String {
    json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": content,
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = make_response(json!([{ "type": "text", "text": "{\"type\":\"WOOD\"}" }]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text, "{\"type\":\"WOOD\"}");
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
    assert_eq!(resp.input_tokens, 100);
    assert_eq!(resp.output_tokens, 50);
}

#[test]
fn parse_thinking_blocks_are_ignored() {
    let json = make_response(json!([
        { "type": "thinking", "thinking": "Let me think..." },
        { "type": "text", "text": "answer" }
    ]));
    assert_eq!(parse_response(&json).unwrap().text, "answer");
}

#[test]
fn parse_no_text_is_empty() {
    let json = make_response(json!([{ "type": "tool_use", "id": "t", "name": "n", "input": {} }]));
    assert!(matches!(parse_response(&json), Err(LlmError::EmptyResponse)));
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_response("not json"), Err(LlmError::ApiParse(_))));
}

#[test]
fn system_includes_schema() {
    let mut request = GenerateRequest::new(ModelTier::Vision).with_schema(json!({ "type": "object" }));
    request.system = Some("You classify waste.".into());
    let system = build_system(&request).unwrap();
    assert!(system.starts_with("You classify waste."));
    assert!(system.contains("JSON Schema"));
    assert!(system.contains("\"object\""));
}

#[test]
fn system_absent_without_schema_or_prompt() {
    let request = GenerateRequest::new(ModelTier::Chat).with_text("hi");
    assert!(build_system(&request).is_none());
}

#[tokio::test]
async fn generate_sends_base64_image_block() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/messages")
                .header("x-api-key", "k")
                .header("anthropic-version", "2023-06-01")
                .body_contains("\"media_type\":\"image/png\"");
            then.status(200)
                .body(make_response(json!([{ "type": "text", "text": "{}" }])));
        })
        .await;

    let client =
        AnthropicClient::new("k".into(), server.base_url(), LlmTimeouts { request_secs: 5, connect_secs: 2 }).unwrap();
    let request = GenerateRequest::new(ModelTier::Vision)
        .with_media("image/png", "AAAA")
        .with_text("classify");
    let resp = client.generate("claude-haiku-4-5", &request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(resp.text, "{}");
}
