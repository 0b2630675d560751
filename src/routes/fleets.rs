//! Fleets, driver onboarding and review, fleet projects, and the ledger.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Actor, Driver, Fleet, FleetProject, UserRole};
use crate::services::fleet::{self, DriverRegistration, FleetError, Ledger, LedgerFilter, Onboarded};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub approve: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProjectBody {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LedgerQuery {
    pub search: Option<String>,
    pub filter: LedgerFilter,
}

pub(crate) fn fleet_error_to_status(err: &FleetError) -> StatusCode {
    match err {
        FleetError::NotFound(_) | FleetError::DriverNotFound(_) | FleetError::ProjectNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        FleetError::AlreadyRegistered(_) => StatusCode::CONFLICT,
        FleetError::MissingField(_) => StatusCode::BAD_REQUEST,
        FleetError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

impl From<FleetError> for ApiError {
    fn from(err: FleetError) -> Self {
        Self::from_error(fleet_error_to_status(&err), &err)
    }
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Fleet>> {
    Json(fleet::list(&state).await)
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Fleet>, ApiError> {
    Ok(Json(fleet::get(&state, id).await?))
}

pub async fn drivers(State(state): State<AppState>, _actor: Actor, Path(id): Path<Uuid>) -> Json<Vec<Driver>> {
    Json(fleet::drivers(&state, id).await)
}

pub async fn ledger(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
    Query(q): Query<LedgerQuery>,
) -> Result<Json<Ledger>, ApiError> {
    Ok(Json(fleet::ledger(&state, id, q.search.as_deref(), q.filter).await?))
}

pub async fn verify_fleet(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<Fleet>, ApiError> {
    Ok(Json(fleet::verify_fleet(&state, actor, id, body.approve).await?))
}

pub async fn add_project(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<ProjectBody>,
) -> Result<(StatusCode, Json<FleetProject>), ApiError> {
    let project = fleet::add_project(&state, actor, id, &body.name, &body.address).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn review_project(
    State(state): State<AppState>,
    actor: Actor,
    Path((id, project_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<FleetProject>, ApiError> {
    Ok(Json(fleet::review_project(&state, actor, id, project_id, body.approve).await?))
}

/// The caller registers itself: the driver id is the actor id.
pub async fn onboard_driver(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<DriverRegistration>,
) -> Result<(StatusCode, Json<Onboarded>), ApiError> {
    if actor.role != UserRole::Driver {
        return Err(FleetError::Forbidden("only drivers can register as drivers".into()).into());
    }
    let onboarded = fleet::onboard_driver(&state, actor.id, body).await?;
    Ok((StatusCode::CREATED, Json(onboarded)))
}

pub async fn verify_driver(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(fleet::verify_driver(&state, actor, id, body.approve).await?))
}

#[cfg(test)]
#[path = "fleets_test.rs"]
mod tests;
