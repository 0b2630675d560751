//! Fleets, driver onboarding and verification, projects, and the ledger.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::model::{
    Actor, Driver, Fleet, FleetProject, Order, OrderStatus, ProjectStatus, UserRole, VerificationStatus, now_ms,
};
use crate::state::{AppState, Store};

pub const INDEPENDENT_FLEET_NAME: &str = "个人自营";
const NEW_FLEET_SAFETY_SCORE: u32 = 60;

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("fleet not found: {0}")]
    NotFound(Uuid),
    #[error("driver not found: {0}")]
    DriverNotFound(Uuid),
    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),
    #[error("driver already registered: {0}")]
    AlreadyRegistered(Uuid),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl crate::error::ErrorCode for FleetError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_FLEET_NOT_FOUND",
            Self::DriverNotFound(_) => "E_DRIVER_NOT_FOUND",
            Self::ProjectNotFound(_) => "E_PROJECT_NOT_FOUND",
            Self::AlreadyRegistered(_) => "E_ALREADY_REGISTERED",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::Forbidden(_) => "E_FORBIDDEN",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRegistration {
    pub name: String,
    pub phone: String,
    pub license_number: String,
    pub vehicle_plate: String,
    pub vehicle_type: String,
    pub is_independent: bool,
    /// Existing fleet to join, or the name of a new one to create.
    #[serde(default)]
    pub fleet_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Onboarded {
    pub driver: Driver,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_fleet: Option<Fleet>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerFilter {
    #[default]
    All,
    Settled,
    Unsettled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub orders: Vec<Order>,
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
}

fn required(value: &str, field: &'static str) -> Result<(), FleetError> {
    if value.trim().is_empty() { Err(FleetError::MissingField(field)) } else { Ok(()) }
}

fn fleet_mut(store: &mut Store, id: Uuid) -> Result<&mut Fleet, FleetError> {
    store.fleets.get_mut(&id).ok_or(FleetError::NotFound(id))
}

// =============================================================================
// QUERIES
// =============================================================================

pub async fn list(state: &AppState) -> Vec<Fleet> {
    let store = state.store.read().await;
    let mut fleets: Vec<Fleet> = store.fleets.values().cloned().collect();
    fleets.sort_by(|a, b| a.name.cmp(&b.name));
    fleets
}

/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn get(state: &AppState, id: Uuid) -> Result<Fleet, FleetError> {
    let store = state.store.read().await;
    store.fleets.get(&id).cloned().ok_or(FleetError::NotFound(id))
}

/// Drivers registered under a fleet.
pub async fn drivers(state: &AppState, fleet_id: Uuid) -> Vec<Driver> {
    let store = state.store.read().await;
    let mut drivers: Vec<Driver> = store
        .drivers
        .values()
        .filter(|d| d.fleet_id == Some(fleet_id))
        .cloned()
        .collect();
    drivers.sort_by_key(|d| d.joined_at);
    drivers
}

// =============================================================================
// DRIVERS
// =============================================================================

/// Register a driver as PENDING under `driver_id`. A fleet name that
/// matches no fleet creates that fleet, also PENDING.
///
/// # Errors
///
/// `MissingField` for blank required fields, `AlreadyRegistered`.
pub async fn onboard_driver(state: &AppState, driver_id: Uuid, reg: DriverRegistration) -> Result<Onboarded, FleetError> {
    required(&reg.name, "name")?;
    required(&reg.phone, "phone")?;
    required(&reg.vehicle_plate, "vehiclePlate")?;
    let fleet_name = reg
        .fleet_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    if !reg.is_independent && fleet_name.is_none() {
        return Err(FleetError::MissingField("fleetName"));
    }

    let mut store = state.store.write().await;
    if store.drivers.contains_key(&driver_id) {
        return Err(FleetError::AlreadyRegistered(driver_id));
    }

    let mut new_fleet = None;
    let (fleet_id, fleet_name) = match fleet_name {
        Some(name) if !reg.is_independent => {
            let existing = store.fleets.values().find(|f| f.name == name).map(|f| f.id);
            let fleet_id = match existing {
                Some(id) => id,
                None => {
                    let id = Uuid::new_v4();
                    let fleet = Fleet {
                        id,
                        name: name.clone(),
                        manager_name: reg.name.clone(),
                        total_vehicles: 1,
                        safety_score: NEW_FLEET_SAFETY_SCORE,
                        is_authorized_print: false,
                        status: VerificationStatus::Pending,
                        projects: Vec::new(),
                        drivers: Vec::new(),
                    };
                    info!(fleet_id = %id, %name, "fleet: created on driver onboarding");
                    store.fleets.insert(id, fleet);
                    new_fleet = Some(id);
                    id
                }
            };
            if let Some(fleet) = store.fleets.get_mut(&fleet_id) {
                fleet.drivers.push(driver_id);
            }
            (Some(fleet_id), name)
        }
        _ => (None, INDEPENDENT_FLEET_NAME.to_string()),
    };

    let driver = Driver {
        id: driver_id,
        name: reg.name,
        phone: reg.phone,
        license_number: reg.license_number,
        vehicle_plate: reg.vehicle_plate,
        vehicle_type: reg.vehicle_type,
        status: VerificationStatus::Pending,
        joined_at: now_ms(),
        fleet_id,
        fleet_name: Some(fleet_name),
        is_independent: reg.is_independent,
    };
    store.drivers.insert(driver_id, driver.clone());
    info!(%driver_id, fleet_id = ?fleet_id, independent = reg.is_independent, "fleet: driver onboarded");

    let new_fleet = new_fleet.and_then(|id| store.fleets.get(&id).cloned());
    Ok(Onboarded { driver, new_fleet })
}

/// Approve or reject a driver. Government may review anyone; a fleet only
/// its own drivers.
///
/// # Errors
///
/// `DriverNotFound`, `Forbidden`.
pub async fn verify_driver(state: &AppState, actor: Actor, driver_id: Uuid, approve: bool) -> Result<Driver, FleetError> {
    let mut store = state.store.write().await;
    let driver = store.drivers.get_mut(&driver_id).ok_or(FleetError::DriverNotFound(driver_id))?;
    let allowed = match actor.role {
        UserRole::Government => true,
        UserRole::Fleet => driver.fleet_id == Some(actor.id),
        _ => false,
    };
    if !allowed {
        return Err(FleetError::Forbidden(format!("{} cannot review this driver", actor.role)));
    }
    driver.status = if approve { VerificationStatus::Verified } else { VerificationStatus::Rejected };
    info!(%driver_id, status = ?driver.status, reviewer = %actor.role, "fleet: driver reviewed");
    Ok(driver.clone())
}

/// # Errors
///
/// `Forbidden` for non-government callers; `NotFound`.
pub async fn verify_fleet(state: &AppState, actor: Actor, fleet_id: Uuid, approve: bool) -> Result<Fleet, FleetError> {
    if actor.role != UserRole::Government {
        return Err(FleetError::Forbidden("only government can review fleets".into()));
    }
    let mut store = state.store.write().await;
    let fleet = fleet_mut(&mut store, fleet_id)?;
    fleet.status = if approve { VerificationStatus::Verified } else { VerificationStatus::Rejected };
    Ok(fleet.clone())
}

// =============================================================================
// PROJECTS
// =============================================================================

/// # Errors
///
/// `Forbidden` unless the caller is the fleet; `MissingField`; `NotFound`.
pub async fn add_project(
    state: &AppState,
    actor: Actor,
    fleet_id: Uuid,
    name: &str,
    address: &str,
) -> Result<FleetProject, FleetError> {
    if actor.role != UserRole::Fleet || actor.id != fleet_id {
        return Err(FleetError::Forbidden("only the fleet can add its projects".into()));
    }
    required(name, "name")?;
    required(address, "address")?;

    let mut store = state.store.write().await;
    let fleet = fleet_mut(&mut store, fleet_id)?;
    let project = FleetProject {
        id: Uuid::new_v4(),
        name: name.trim().to_string(),
        address: address.trim().to_string(),
        status: ProjectStatus::Pending,
        created_at: now_ms(),
    };
    fleet.projects.push(project.clone());
    info!(%fleet_id, project_id = %project.id, "fleet: project submitted");
    Ok(project)
}

/// # Errors
///
/// `Forbidden` for non-government callers; fleet or project not found.
pub async fn review_project(
    state: &AppState,
    actor: Actor,
    fleet_id: Uuid,
    project_id: Uuid,
    approve: bool,
) -> Result<FleetProject, FleetError> {
    if actor.role != UserRole::Government {
        return Err(FleetError::Forbidden("only government can review projects".into()));
    }
    let mut store = state.store.write().await;
    let fleet = fleet_mut(&mut store, fleet_id)?;
    let project = fleet
        .projects
        .iter_mut()
        .find(|p| p.id == project_id)
        .ok_or(FleetError::ProjectNotFound(project_id))?;
    project.status = if approve { ProjectStatus::Approved } else { ProjectStatus::Rejected };
    Ok(project.clone())
}

// =============================================================================
// LEDGER
// =============================================================================

/// Orders carried under the fleet, newest first, with revenue sums.
/// `search` matches driver name, plate, or community.
///
/// # Errors
///
/// `NotFound` for an unknown fleet.
pub async fn ledger(state: &AppState, fleet_id: Uuid, search: Option<&str>, filter: LedgerFilter) -> Result<Ledger, FleetError> {
    let store = state.store.read().await;
    if !store.fleets.contains_key(&fleet_id) {
        return Err(FleetError::NotFound(fleet_id));
    }
    let needle = search.map(str::trim).filter(|s| !s.is_empty());

    let orders: Vec<Order> = store
        .orders_newest_first()
        .into_iter()
        .filter(|o| o.fleet_id() == Some(fleet_id))
        .filter(|o| needle.is_none_or(|n| ledger_matches(o, n)))
        .filter(|o| match filter {
            LedgerFilter::All => true,
            LedgerFilter::Settled => o.status == OrderStatus::Completed,
            LedgerFilter::Unsettled => o.status != OrderStatus::Completed,
        })
        .cloned()
        .collect();

    let total: i64 = orders.iter().map(Order::estimated_price).sum();
    let completed: i64 = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(Order::estimated_price)
        .sum();
    Ok(Ledger { orders, total, completed, pending: total - completed })
}

fn ledger_matches(order: &Order, needle: &str) -> bool {
    order
        .assigned_driver
        .as_ref()
        .is_some_and(|d| d.name.contains(needle) || d.plate.contains(needle))
        || order
            .pickup_details
            .as_ref()
            .is_some_and(|p| p.community.contains(needle))
}

#[cfg(test)]
#[path = "fleet_test.rs"]
mod tests;
