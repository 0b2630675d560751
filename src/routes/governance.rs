//! Notices, complaints, and city statistics.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Actor, Complaint, Notice};
use crate::services::governance::{self, CityStats, GovernanceError, NewComplaint, NewNotice};
use crate::state::AppState;

pub(crate) fn governance_error_to_status(err: &GovernanceError) -> StatusCode {
    match err {
        GovernanceError::ComplaintNotFound(_) => StatusCode::NOT_FOUND,
        GovernanceError::MissingField(_) => StatusCode::BAD_REQUEST,
        GovernanceError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

impl From<GovernanceError> for ApiError {
    fn from(err: GovernanceError) -> Self {
        Self::from_error(governance_error_to_status(&err), &err)
    }
}

/// Notices addressed to the caller's role, newest first.
pub async fn notices(State(state): State<AppState>, actor: Actor) -> Json<Vec<Notice>> {
    Json(governance::notices_for(&state, actor.role).await)
}

pub async fn publish(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<NewNotice>,
) -> Result<(StatusCode, Json<Notice>), ApiError> {
    let notice = governance::publish(&state, actor, body).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

pub async fn complaints(State(state): State<AppState>, actor: Actor) -> Json<Vec<Complaint>> {
    Json(governance::complaints(&state, actor).await)
}

pub async fn file(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<NewComplaint>,
) -> Result<(StatusCode, Json<Complaint>), ApiError> {
    let complaint = governance::file(&state, actor, body).await?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

pub async fn resolve(State(state): State<AppState>, actor: Actor, Path(id): Path<Uuid>) -> Result<Json<Complaint>, ApiError> {
    Ok(Json(governance::resolve(&state, actor, id).await?))
}

pub async fn stats(State(state): State<AppState>, _actor: Actor) -> Json<CityStats> {
    Json(governance::stats(&state).await)
}

#[cfg(test)]
#[path = "governance_test.rs"]
mod tests;
