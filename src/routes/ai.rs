//! Classification and copilot endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::ApiError;
use crate::model::{Actor, ChatMessage, MediaType, ProductAnalysis, WasteAnalysis};
use crate::services::classify::{self, Classified};
use crate::services::copilot::{self, CopilotError, CopilotReply};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteBody {
    pub media: String,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductBody {
    pub image: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub context_summary: Option<String>,
}

pub(crate) fn copilot_error_to_status(err: &CopilotError) -> StatusCode {
    match err {
        CopilotError::EmptyMessage => StatusCode::BAD_REQUEST,
    }
}

impl From<CopilotError> for ApiError {
    fn from(err: CopilotError) -> Self {
        Self::from_error(copilot_error_to_status(&err), &err)
    }
}

fn require_media(media: &str, field: &str) -> Result<(), ApiError> {
    if media.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(())
}

/// Classification never fails once the body is valid; a model failure
/// comes back as the fallback record with `fallback: true`.
pub async fn analyze_waste(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<WasteBody>,
) -> Result<Json<Classified<WasteAnalysis>>, ApiError> {
    require_media(&body.media, "media")?;
    let media_type = body.media_type.unwrap_or(MediaType::Image);
    let classified = classify::analyze_waste(
        &state,
        actor.id,
        &body.media,
        media_type,
        body.mime_type.as_deref(),
        body.note.as_deref(),
    )
    .await;
    Ok(Json(classified))
}

pub async fn analyze_product(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<ProductBody>,
) -> Result<Json<Classified<ProductAnalysis>>, ApiError> {
    require_media(&body.image, "image")?;
    Ok(Json(classify::analyze_product(&state, actor.id, &body.image).await))
}

pub async fn copilot_chat(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<ChatBody>,
) -> Result<Json<CopilotReply>, ApiError> {
    let reply = copilot::chat(&state, actor, &body.message, body.context_summary.as_deref()).await?;
    Ok(Json(reply))
}

pub async fn copilot_history(State(state): State<AppState>, actor: Actor) -> Json<Vec<ChatMessage>> {
    Json(copilot::history(&state, actor.id).await)
}

#[cfg(test)]
#[path = "ai_test.rs"]
mod tests;
