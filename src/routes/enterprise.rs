//! Enterprise credit accounts, sites, bulk removal, and procurement.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Actor, EnterpriseProject, Order};
use crate::services::enterprise::{
    self, AccountView, BulkRemoval, BulkRemovalResult, EnterpriseError, NewProject, Procurement,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCost {
    pub project_id: Uuid,
    pub total: i64,
}

pub(crate) fn enterprise_error_to_status(err: &EnterpriseError) -> StatusCode {
    match err {
        EnterpriseError::NotFound(_) | EnterpriseError::ProjectNotFound(_) | EnterpriseError::FleetNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        EnterpriseError::ProjectNotApproved | EnterpriseError::CreditExceeded { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EnterpriseError::NoTrucks | EnterpriseError::MissingField(_) => StatusCode::BAD_REQUEST,
        EnterpriseError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

impl From<EnterpriseError> for ApiError {
    fn from(err: EnterpriseError) -> Self {
        Self::from_error(enterprise_error_to_status(&err), &err)
    }
}

pub async fn account(State(state): State<AppState>, _actor: Actor, Path(id): Path<Uuid>) -> Result<Json<AccountView>, ApiError> {
    Ok(Json(enterprise::account(&state, id).await?))
}

pub async fn add_project(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<NewProject>,
) -> Result<(StatusCode, Json<EnterpriseProject>), ApiError> {
    let project = enterprise::add_project(&state, actor, id, body).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn project_cost(
    State(state): State<AppState>,
    _actor: Actor,
    Path((id, project_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectCost>, ApiError> {
    let total = enterprise::project_cost(&state, id, project_id).await?;
    Ok(Json(ProjectCost { project_id, total }))
}

pub async fn bulk_removal(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<BulkRemoval>,
) -> Result<(StatusCode, Json<BulkRemovalResult>), ApiError> {
    let result = enterprise::bulk_removal(&state, actor, id, body).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn procurement(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<Procurement>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = enterprise::procurement(&state, actor, id, body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[cfg(test)]
#[path = "enterprise_test.rs"]
mod tests;
