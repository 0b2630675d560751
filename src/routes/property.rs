//! Renovation permits and community clearance for property managers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Actor, Order, ProjectStatus, RenovationApplication};
use crate::services::property::{self, Clearance, NewRenovation, PropertyError};
use crate::state::AppState;

/// `GET /api/renovations`: the caller's own queue, PENDING unless asked.
#[derive(Debug, Deserialize)]
pub struct ApplicationQuery {
    #[serde(default = "pending")]
    pub status: ProjectStatus,
}

fn pending() -> ProjectStatus {
    ProjectStatus::Pending
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unsettled {
    pub property_id: Uuid,
    pub amount: i64,
}

pub(crate) fn property_error_to_status(err: &PropertyError) -> StatusCode {
    match err {
        PropertyError::NotFound(_) | PropertyError::ApplicationNotFound(_) | PropertyError::SupplierNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        PropertyError::AlreadyReviewed => StatusCode::CONFLICT,
        PropertyError::CommunityNotManaged(_) | PropertyError::SupplierInactive => StatusCode::UNPROCESSABLE_ENTITY,
        PropertyError::MissingField(_) => StatusCode::BAD_REQUEST,
        PropertyError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

impl From<PropertyError> for ApiError {
    fn from(err: PropertyError) -> Self {
        Self::from_error(property_error_to_status(&err), &err)
    }
}

pub async fn submit(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<NewRenovation>,
) -> Result<(StatusCode, Json<RenovationApplication>), ApiError> {
    let application = property::submit(&state, actor, body).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn applications(
    State(state): State<AppState>,
    actor: Actor,
    Query(q): Query<ApplicationQuery>,
) -> Result<Json<Vec<RenovationApplication>>, ApiError> {
    Ok(Json(property::applications(&state, actor, actor.id, q.status).await?))
}

pub async fn approve(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<RenovationApplication>, ApiError> {
    Ok(Json(property::approve(&state, actor, id).await?))
}

pub async fn reject(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<RenovationApplication>, ApiError> {
    Ok(Json(property::reject(&state, actor, id).await?))
}

pub async fn dispatch_clearance(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<Clearance>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = property::dispatch_clearance(&state, actor, id, body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn community_orders(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(property::community_orders(&state, actor, id).await?))
}

pub async fn unsettled(State(state): State<AppState>, actor: Actor, Path(id): Path<Uuid>) -> Result<Json<Unsettled>, ApiError> {
    let amount = property::unsettled_amount(&state, actor, id).await?;
    Ok(Json(Unsettled { property_id: id, amount }))
}

#[cfg(test)]
#[path = "property_test.rs"]
mod tests;
