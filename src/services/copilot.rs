//! "Eco-Brain" conversational assistant.
//!
//! One model call per message. The reply may carry one of four actions,
//! which the caller executes after `executeAfterMs`. Model failures become
//! a fixed busy reply with no action.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::{ai, dashboard};
use crate::llm::types::{GenerateRequest, ModelTier};
use crate::model::{Actor, ChatMessage, ChatSender, now_ms};
use crate::state::AppState;

pub const BUSY_REPLY: &str = "系统繁忙，请稍后再试。(AI Busy)";
const NAVIGATE_DELAY_MS: u64 = 1500;
const CREATE_DELAY_MS: u64 = 1000;
const COPILOT_MAX_TOKENS: u32 = 512;

#[derive(Debug, thiserror::Error)]
pub enum CopilotError {
    #[error("message must not be empty")]
    EmptyMessage,
}

impl crate::error::ErrorCode for CopilotError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "E_EMPTY_MESSAGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopilotAction {
    #[serde(rename = "NAVIGATE:MARKET")]
    NavigateMarket,
    #[serde(rename = "NAVIGATE:DASHBOARD")]
    NavigateDashboard,
    #[serde(rename = "NAVIGATE:PROFILE")]
    NavigateProfile,
    #[serde(rename = "CREATE:ORDER")]
    CreateOrder,
}

impl CopilotAction {
    pub const ALL: [Self; 4] = [Self::NavigateMarket, Self::NavigateDashboard, Self::NavigateProfile, Self::CreateOrder];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NavigateMarket => "NAVIGATE:MARKET",
            Self::NavigateDashboard => "NAVIGATE:DASHBOARD",
            Self::NavigateProfile => "NAVIGATE:PROFILE",
            Self::CreateOrder => "CREATE:ORDER",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == raw.trim())
    }

    /// Delay before the client should perform the action.
    #[must_use]
    pub fn execute_after_ms(self) -> u64 {
        match self {
            Self::CreateOrder => CREATE_DELAY_MS,
            Self::NavigateMarket | Self::NavigateDashboard | Self::NavigateProfile => NAVIGATE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopilotReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<CopilotAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execute_after_ms: Option<u64>,
    pub fallback: bool,
}

impl CopilotReply {
    fn busy() -> Self {
        Self { reply: BUSY_REPLY.into(), action: None, execute_after_ms: None, fallback: true }
    }
}

/// Model reply. `action` stays a string so unknown values drop the action
/// instead of the whole reply.
#[derive(Deserialize)]
struct ModelReply {
    reply: String,
    #[serde(default)]
    action: Option<String>,
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Answer one message and append both sides to the actor's transcript.
///
/// # Errors
///
/// [`CopilotError::EmptyMessage`] for blank input; no model call is made.
pub async fn chat(
    state: &AppState,
    actor: Actor,
    message: &str,
    context_summary: Option<&str>,
) -> Result<CopilotReply, CopilotError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(CopilotError::EmptyMessage);
    }

    let summary = match context_summary.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => {
            let store = state.store.read().await;
            dashboard::context_summary(&store, actor)
        }
    };

    let request = GenerateRequest::new(ModelTier::Chat)
        .with_text(build_prompt(actor, &summary, message))
        .with_schema(reply_schema());
    let request = GenerateRequest { max_tokens: COPILOT_MAX_TOKENS, ..request };

    let reply = match ai::generate_json::<ModelReply>(state, actor.id, &request).await {
        Ok(r) if !r.reply.trim().is_empty() => {
            let action = r.action.as_deref().and_then(CopilotAction::parse);
            info!(actor_id = %actor.id, role = %actor.role, action = ?action, "copilot: replied");
            CopilotReply {
                reply: r.reply,
                action,
                execute_after_ms: action.map(CopilotAction::execute_after_ms),
                fallback: false,
            }
        }
        Ok(_) => {
            warn!(actor_id = %actor.id, "copilot: blank reply, using busy message");
            CopilotReply::busy()
        }
        Err(e) => {
            warn!(actor_id = %actor.id, error = %e, "copilot: model call failed, using busy message");
            CopilotReply::busy()
        }
    };

    record_exchange(state, actor.id, message, &reply).await;
    Ok(reply)
}

/// Transcript for one actor, oldest first.
pub async fn history(state: &AppState, actor_id: Uuid) -> Vec<ChatMessage> {
    let store = state.store.read().await;
    store
        .copilot_history
        .get(&actor_id)
        .map(|h| h.iter().cloned().collect())
        .unwrap_or_default()
}

async fn record_exchange(state: &AppState, actor_id: Uuid, message: &str, reply: &CopilotReply) {
    let cap = state.config.ai.copilot_history_cap;
    let now = now_ms();
    let mut store = state.store.write().await;
    let log = store.copilot_history.entry(actor_id).or_default();
    log.push_back(ChatMessage {
        id: Uuid::new_v4(),
        text: message.to_string(),
        sender: ChatSender::User,
        timestamp: now,
        action: None,
    });
    log.push_back(ChatMessage {
        id: Uuid::new_v4(),
        text: reply.reply.clone(),
        sender: ChatSender::Ai,
        timestamp: now,
        action: reply.action.map(|a| a.as_str().to_string()),
    });
    while log.len() > cap {
        log.pop_front();
    }
}

fn build_prompt(actor: Actor, summary: &str, message: &str) -> String {
    format!(
        "You are \"Eco-Brain\", the AI Copilot for the EcoClear waste management platform.
Current User Role: {role}.
Context Summary: {summary}

Your goal is to help the user navigate the app, understand data, or perform actions.

Response Instructions:
1. Keep answers concise, friendly, and professional (in Chinese).
2. If the user asks to go somewhere, return an 'action' field with the navigation target.
3. If the user asks about data, use the Context Summary to answer.

Available Actions (return in 'action' field if applicable):
- NAVIGATE:MARKET (Go to marketplace)
- NAVIGATE:DASHBOARD (Go to main dashboard)
- NAVIGATE:PROFILE (Go to settings)
- CREATE:ORDER (Start a new order flow)

User Query: <user_input>{message}</user_input>",
        role = actor.role,
    )
}

fn reply_schema() -> serde_json::Value {
    let actions: Vec<&str> = CopilotAction::ALL.iter().map(|a| a.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "reply": { "type": "string" },
            "action": { "type": "string", "enum": actions }
        },
        "required": ["reply"]
    })
}

#[cfg(test)]
#[path = "copilot_test.rs"]
mod tests;
