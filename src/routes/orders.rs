//! Order lifecycle endpoints.
//!
//! Every mutation goes through `services::order`, which owns the transition
//! table and role checks. The handlers only translate HTTP in and out.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{Actor, Manifest, Order, OrderStatus};
use crate::services::manifest as manifests;
use crate::services::order::{self, CompletedOrder, CreatedOrder, NewOrder, OrderError, OrderFilter, SelfOrder};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceBody {
    pub to: OrderStatus,
    #[serde(default)]
    pub loading_photo: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    pub driver_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposalEntryBody {
    pub entry_photo: String,
}

/// Certificate view of an order. Before disposal there is no manifest,
/// and `displaySerial` carries the provisional `CERT-` number.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestView {
    pub display_serial: String,
    #[serde(flatten)]
    pub manifest: Option<Manifest>,
    pub verified: bool,
}

pub(crate) fn order_error_to_status(err: &OrderError) -> StatusCode {
    match err {
        OrderError::NotFound(_) => StatusCode::NOT_FOUND,
        OrderError::Forbidden(_) => StatusCode::FORBIDDEN,
        OrderError::IllegalTransition { .. }
        | OrderError::DedicatedOperation { .. }
        | OrderError::AlreadyAssigned
        | OrderError::DriverBusy
        | OrderError::FacilityFull => StatusCode::CONFLICT,
        OrderError::UnsupportedOrderType(_)
        | OrderError::MissingMedia
        | OrderError::MissingPhoto
        | OrderError::WasteNotAccepted(_) => StatusCode::BAD_REQUEST,
        OrderError::DriverNotFound(_)
        | OrderError::FleetNotFound(_)
        | OrderError::ProjectNotFound(_)
        | OrderError::WorkerNotFound(_)
        | OrderError::FacilityNotFound(_) => StatusCode::NOT_FOUND,
        OrderError::DriverNotVerified
        | OrderError::DriverNotInFleet
        | OrderError::ProjectNotApproved
        | OrderError::WorkerNotVerified => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        Self::from_error(order_error_to_status(&err), &err)
    }
}

// =============================================================================
// CREATION & QUERIES
// =============================================================================

pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<NewOrder>,
) -> Result<(StatusCode, Json<CreatedOrder>), ApiError> {
    let created = order::create_from_media(&state, actor, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn self_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<SelfOrder>,
) -> Result<(StatusCode, Json<CreatedOrder>), ApiError> {
    let created = order::driver_self_order(&state, actor, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(State(state): State<AppState>, actor: Actor, Query(filter): Query<OrderFilter>) -> Json<Vec<Order>> {
    Json(order::list(&state, actor, &filter).await)
}

pub async fn get(State(state): State<AppState>, _actor: Actor, Path(id): Path<Uuid>) -> Result<Json<Order>, ApiError> {
    Ok(Json(order::get(&state, id).await?))
}

pub async fn manifest(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<ManifestView>, ApiError> {
    let store = state.store.read().await;
    let order = store.orders.get(&id).ok_or(OrderError::NotFound(id))?;
    let manifest = manifests::for_order(&store, id).cloned();
    let verified = manifest.as_ref().is_some_and(manifests::verify);
    Ok(Json(ManifestView { display_serial: order.display_serial(), manifest, verified }))
}

// =============================================================================
// TRANSITIONS
// =============================================================================

pub async fn confirm(State(state): State<AppState>, actor: Actor, Path(id): Path<Uuid>) -> Result<Json<Order>, ApiError> {
    Ok(Json(order::confirm(&state, actor, id).await?))
}

pub async fn accept(State(state): State<AppState>, actor: Actor, Path(id): Path<Uuid>) -> Result<Json<Order>, ApiError> {
    Ok(Json(order::driver_accept(&state, actor, id).await?))
}

pub async fn grab(State(state): State<AppState>, actor: Actor, Path(id): Path<Uuid>) -> Result<Json<Order>, ApiError> {
    Ok(Json(order::fleet_grab(&state, actor, id).await?))
}

pub async fn assign(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignBody>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(order::fleet_assign(&state, actor, id, body.driver_id).await?))
}

pub async fn advance(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<AdvanceBody>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(order::advance(&state, actor, id, body.to, body.loading_photo).await?))
}

pub async fn worker_accept(State(state): State<AppState>, actor: Actor, Path(id): Path<Uuid>) -> Result<Json<Order>, ApiError> {
    Ok(Json(order::worker_accept(&state, actor, id).await?))
}

pub async fn worker_complete(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(order::worker_complete(&state, actor, id).await?))
}

pub async fn disposal_entry(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(body): Json<DisposalEntryBody>,
) -> Result<Json<CompletedOrder>, ApiError> {
    Ok(Json(order::confirm_disposal_entry(&state, actor, id, &body.entry_photo).await?))
}

#[cfg(test)]
#[path = "orders_test.rs"]
mod tests;
