use super::*;
use crate::llm::types::LlmError;
use crate::model::{OrderStatus, OrderType, UserRole};
use crate::state::test_helpers::{self, MockLlm};
use std::sync::Arc;

fn client() -> Actor {
    Actor::new(UserRole::Client, Uuid::new_v4())
}

#[test]
fn action_parse_accepts_only_known_values() {
    for action in CopilotAction::ALL {
        assert_eq!(CopilotAction::parse(action.as_str()), Some(action));
    }
    assert_eq!(CopilotAction::parse("NAVIGATE:SETTINGS"), None);
    assert_eq!(CopilotAction::parse(""), None);
}

#[test]
fn execute_delay_depends_on_action() {
    assert_eq!(CopilotAction::NavigateMarket.execute_after_ms(), 1500);
    assert_eq!(CopilotAction::CreateOrder.execute_after_ms(), 1000);
}

#[tokio::test]
async fn empty_message_is_rejected_without_model_call() {
    let mock = Arc::new(MockLlm::replying(r#"{"reply":"hi"}"#));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let err = chat(&state, client(), "   ", None).await.unwrap_err();
    assert!(matches!(err, CopilotError::EmptyMessage));
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn reply_with_navigation_action() {
    let mock = Arc::new(MockLlm::replying(r#"{"reply":"好的，正在前往市场","action":"NAVIGATE:MARKET"}"#));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let reply = chat(&state, client(), "带我去市场", None).await.unwrap();
    assert_eq!(reply.action, Some(CopilotAction::NavigateMarket));
    assert_eq!(reply.execute_after_ms, Some(1500));
    assert!(!reply.fallback);
}

#[tokio::test]
async fn unknown_action_is_dropped() {
    let mock = Arc::new(MockLlm::replying(r#"{"reply":"ok","action":"DELETE:EVERYTHING"}"#));
    let state = test_helpers::test_app_state_with_llm(mock);
    let reply = chat(&state, client(), "hello", None).await.unwrap();
    assert_eq!(reply.reply, "ok");
    assert_eq!(reply.action, None);
    assert_eq!(reply.execute_after_ms, None);
}

#[tokio::test]
async fn model_failure_gives_busy_reply() {
    let mock = Arc::new(MockLlm::failing(LlmError::ApiResponse { status: 401, body: String::new() }));
    let state = test_helpers::test_app_state_with_llm(mock);
    let reply = chat(&state, client(), "hello", None).await.unwrap();
    assert_eq!(reply.reply, BUSY_REPLY);
    assert_eq!(reply.action, None);
    assert!(reply.fallback);
}

#[tokio::test]
async fn prompt_carries_role_and_store_summary() {
    let mock = Arc::new(MockLlm::replying(r#"{"reply":"你有一个订单"}"#));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let actor = client();
    test_helpers::seed_order(&state, actor, OrderType::WasteRemoval, OrderStatus::PendingPickup).await;

    chat(&state, actor, "我有几个订单？", None).await.unwrap();
    let prompt = mock.last_request().unwrap().prompt_text();
    assert!(prompt.contains("Current User Role: CLIENT"));
    assert!(prompt.contains("1 orders total."));
    assert!(prompt.contains("<user_input>我有几个订单？</user_input>"));
}

#[tokio::test]
async fn caller_summary_overrides_store_summary() {
    let mock = Arc::new(MockLlm::replying(r#"{"reply":"ok"}"#));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    chat(&state, client(), "hi", Some("42 orders total.")).await.unwrap();
    assert!(mock.last_request().unwrap().prompt_text().contains("42 orders total."));
}

#[tokio::test]
async fn history_records_both_sides_and_is_capped() {
    let mut config = test_helpers::test_config();
    config.ai.copilot_history_cap = 4;
    let state = crate::state::AppState::new(config, None);
    let actor = client();

    for i in 0..3 {
        chat(&state, actor, &format!("message {i}"), None).await.unwrap();
    }
    let log = history(&state, actor.id).await;
    assert_eq!(log.len(), 4);
    assert_eq!(log[0].text, "message 1");
    assert_eq!(log[0].sender, ChatSender::User);
    assert_eq!(log[3].sender, ChatSender::Ai);
    assert_eq!(log[3].text, BUSY_REPLY);
}

#[tokio::test]
async fn history_is_per_actor() {
    let state = test_helpers::test_app_state();
    chat(&state, client(), "hi", None).await.unwrap();
    assert!(history(&state, Uuid::new_v4()).await.is_empty());
}
