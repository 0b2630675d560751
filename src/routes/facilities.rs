//! Facility profile, capacity, promotions, settlement, and history.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Actor, Facility, FacilityOperationalStatus, Notice, Order};
use crate::services::facility::{self, FacilityError, FacilityUpdate, Promotion, SettlementFilter, SettlementSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub status: FacilityOperationalStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub search: Option<String>,
    pub filter: SettlementFilter,
}

pub(crate) fn facility_error_to_status(err: &FacilityError) -> StatusCode {
    match err {
        FacilityError::NotFound(_) => StatusCode::NOT_FOUND,
        FacilityError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

impl From<FacilityError> for ApiError {
    fn from(err: FacilityError) -> Self {
        Self::from_error(facility_error_to_status(&err), &err)
    }
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Facility>> {
    Json(facility::list(&state).await)
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Facility>, ApiError> {
    Ok(Json(facility::get(&state, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(patch): Json<FacilityUpdate>,
) -> Result<Json<Facility>, ApiError> {
    Ok(Json(facility::update(&state, actor, id, patch).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Facility>, ApiError> {
    Ok(Json(facility::set_operational_status(&state, actor, id, body.status).await?))
}

pub async fn promote(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(promotion): Json<Promotion>,
) -> Result<(StatusCode, Json<Notice>), ApiError> {
    let notice = facility::publish_promotion(&state, actor, id, promotion).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

pub async fn settlement(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<SettlementSummary>, ApiError> {
    Ok(Json(facility::settlement_summary(&state, id).await?))
}

pub async fn history(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(facility::history(&state, id, q.search.as_deref(), q.filter).await?))
}

#[cfg(test)]
#[path = "facilities_test.rs"]
mod tests;
