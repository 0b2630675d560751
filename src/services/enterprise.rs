//! Enterprise accounts: projects, credit-backed bulk removal, and
//! procurement of recycled material.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::order::{FLEET_DISPATCH_NAME, PENDING_PLATE};
use super::pricing::{self, EnterpriseQuote, EnterpriseServices};
use crate::model::{
    Actor, AssignedDriver, BuyRequirements, CollectionMethod, CustomerRef, EnterpriseAccount, EnterpriseProject,
    ExternalSync, GeoLocation, LaborServiceType, MediaType, Order, OrderStatus, OrderType, PaymentStatus, PickupDetails,
    ProjectStatus, RecycledProductType, SyncStatus, TradeDirection, UserRole, WasteAnalysis, WasteType, now_ms,
};
use crate::state::{AppState, Store};

pub const SYNC_PLATFORM_NAME: &str = "穗联管";
const DEFAULT_LAT: f64 = 31.22;
const DEFAULT_LNG: f64 = 121.48;
const BULK_VEHICLE: &str = "Dump Truck";

#[derive(Debug, thiserror::Error)]
pub enum EnterpriseError {
    #[error("enterprise not found: {0}")]
    NotFound(Uuid),
    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),
    #[error("project is not approved")]
    ProjectNotApproved,
    #[error("fleet not found: {0}")]
    FleetNotFound(Uuid),
    #[error("credit exceeded: need {needed}, available {available}")]
    CreditExceeded { needed: i64, available: i64 },
    #[error("truck count must be at least one")]
    NoTrucks,
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl crate::error::ErrorCode for EnterpriseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_ENTERPRISE_NOT_FOUND",
            Self::ProjectNotFound(_) => "E_PROJECT_NOT_FOUND",
            Self::ProjectNotApproved => "E_PROJECT_NOT_APPROVED",
            Self::FleetNotFound(_) => "E_FLEET_NOT_FOUND",
            Self::CreditExceeded { .. } => "E_CREDIT_EXCEEDED",
            Self::NoTrucks => "E_NO_TRUCKS",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::Forbidden(_) => "E_FORBIDDEN",
        }
    }
}

// =============================================================================
// REQUEST & RESPONSE TYPES
// =============================================================================

/// Account plus derived credit figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    #[serde(flatten)]
    pub account: EnterpriseAccount,
    pub available_credit: i64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub has_construction_permit: bool,
    #[serde(default)]
    pub has_discharge_permit: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRemoval {
    pub project_id: Uuid,
    pub trucks: u32,
    #[serde(default = "default_waste_type")]
    pub waste_type: WasteType,
    pub method: CollectionMethod,
    #[serde(default)]
    pub services: EnterpriseServices,
    /// Fleet to pre-assign; left for the open pool when absent.
    #[serde(default)]
    pub assign_fleet: Option<Uuid>,
}

fn default_waste_type() -> WasteType {
    WasteType::Construction
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRemovalResult {
    pub quote: EnterpriseQuote,
    pub orders: Vec<Order>,
    pub available_credit: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procurement {
    pub project_id: Uuid,
    pub product_type: RecycledProductType,
    pub quantity: String,
    pub target_price: f64,
}

fn require_self(actor: Actor, enterprise_id: Uuid) -> Result<(), EnterpriseError> {
    if actor.role == UserRole::Enterprise && actor.id == enterprise_id {
        Ok(())
    } else {
        Err(EnterpriseError::Forbidden("only the enterprise itself can do this".into()))
    }
}

fn account_mut(store: &mut Store, id: Uuid) -> Result<&mut EnterpriseAccount, EnterpriseError> {
    store.enterprises.get_mut(&id).ok_or(EnterpriseError::NotFound(id))
}

fn approved_project(account: &EnterpriseAccount, project_id: Uuid) -> Result<EnterpriseProject, EnterpriseError> {
    let project = account
        .projects
        .iter()
        .find(|p| p.id == project_id)
        .ok_or(EnterpriseError::ProjectNotFound(project_id))?;
    if project.status != ProjectStatus::Approved {
        return Err(EnterpriseError::ProjectNotApproved);
    }
    Ok(project.clone())
}

// =============================================================================
// ACCOUNT & PROJECTS
// =============================================================================

/// # Errors
///
/// `NotFound` for an unknown enterprise.
pub async fn account(state: &AppState, id: Uuid) -> Result<AccountView, EnterpriseError> {
    let store = state.store.read().await;
    let account = store.enterprises.get(&id).cloned().ok_or(EnterpriseError::NotFound(id))?;
    Ok(view(account))
}

#[allow(clippy::cast_precision_loss)]
fn view(account: EnterpriseAccount) -> AccountView {
    let usage_percent = if account.credit_limit > 0 {
        account.used_credit as f64 / account.credit_limit as f64 * 100.0
    } else {
        0.0
    };
    AccountView { available_credit: account.available_credit(), usage_percent, account }
}

/// Register a site. It starts PENDING, with a sync record queued for the
/// municipal platform.
///
/// # Errors
///
/// `Forbidden`, `MissingField`, `NotFound`.
pub async fn add_project(
    state: &AppState,
    actor: Actor,
    enterprise_id: Uuid,
    input: NewProject,
) -> Result<EnterpriseProject, EnterpriseError> {
    require_self(actor, enterprise_id)?;
    let name = input.name.trim();
    let address = input.address.trim();
    if name.is_empty() {
        return Err(EnterpriseError::MissingField("name"));
    }
    if address.is_empty() {
        return Err(EnterpriseError::MissingField("address"));
    }

    let now = now_ms();
    let external_id = format!("E-{}", rand::rng().random_range(0..10_000));
    let project = EnterpriseProject {
        id: Uuid::new_v4(),
        name: name.to_string(),
        address: address.to_string(),
        location: GeoLocation::at(DEFAULT_LAT, DEFAULT_LNG, address),
        status: ProjectStatus::Pending,
        created_at: now,
        has_construction_permit: input.has_construction_permit,
        has_discharge_permit: input.has_discharge_permit,
        external_sync: Some(ExternalSync {
            platform_name: SYNC_PLATFORM_NAME.into(),
            external_id,
            sync_status: SyncStatus::Pending,
            last_sync_time: now,
        }),
    };

    let mut store = state.store.write().await;
    account_mut(&mut store, enterprise_id)?.projects.push(project.clone());
    info!(%enterprise_id, project_id = %project.id, "enterprise: project submitted");
    Ok(project)
}

/// Total estimated spend on orders tagged with the project's name.
///
/// # Errors
///
/// `NotFound`, `ProjectNotFound`.
pub async fn project_cost(state: &AppState, enterprise_id: Uuid, project_id: Uuid) -> Result<i64, EnterpriseError> {
    let store = state.store.read().await;
    let account = store.enterprises.get(&enterprise_id).ok_or(EnterpriseError::NotFound(enterprise_id))?;
    let project = account
        .projects
        .iter()
        .find(|p| p.id == project_id)
        .ok_or(EnterpriseError::ProjectNotFound(project_id))?;
    Ok(store
        .orders
        .values()
        .filter(|o| o.customer.id == enterprise_id)
        .filter(|o| {
            o.pickup_details
                .as_ref()
                .and_then(|p| p.project_name.as_deref())
                .is_some_and(|n| n == project.name)
        })
        .map(Order::estimated_price)
        .sum())
}

// =============================================================================
// BULK REMOVAL
// =============================================================================

/// Book `trucks` removal orders on credit. Nothing is created when the
/// quote exceeds the available credit.
///
/// # Errors
///
/// `Forbidden`, `NoTrucks`, `NotFound`, project lookups,
/// `FleetNotFound`, `CreditExceeded`.
pub async fn bulk_removal(
    state: &AppState,
    actor: Actor,
    enterprise_id: Uuid,
    input: BulkRemoval,
) -> Result<BulkRemovalResult, EnterpriseError> {
    require_self(actor, enterprise_id)?;
    if input.trucks == 0 {
        return Err(EnterpriseError::NoTrucks);
    }

    let mut store = state.store.write().await;
    let account = store.enterprises.get(&enterprise_id).ok_or(EnterpriseError::NotFound(enterprise_id))?;
    let project = approved_project(account, input.project_id)?;
    let quote = pricing::enterprise_quote(account.contract_price_per_truck, input.method, input.services, input.trucks);
    let available = account.available_credit();
    if quote.total > available {
        warn!(%enterprise_id, needed = quote.total, available, "enterprise: bulk removal over credit");
        return Err(EnterpriseError::CreditExceeded { needed: quote.total, available });
    }

    let fleet = match input.assign_fleet {
        Some(id) => {
            let fleet = store.fleets.get(&id).ok_or(EnterpriseError::FleetNotFound(id))?;
            Some(AssignedDriver {
                driver_id: None,
                name: FLEET_DISPATCH_NAME.into(),
                phone: String::new(),
                plate: format!("{PENDING_PLATE}车辆"),
                fleet_name: Some(fleet.name.clone()),
                fleet_id: Some(id),
            })
        }
        None => None,
    };

    let orders: Vec<Order> = (1..=input.trucks)
        .map(|i| bulk_order(enterprise_id, &project, &input, &quote, fleet.clone(), i))
        .collect();
    for order in &orders {
        store.orders.insert(order.id, order.clone());
    }
    let account = account_mut(&mut store, enterprise_id)?;
    account.used_credit += quote.total;
    let available_credit = account.available_credit();

    info!(
        %enterprise_id,
        project = %project.name,
        trucks = input.trucks,
        total = quote.total,
        "enterprise: bulk removal booked"
    );
    Ok(BulkRemovalResult { quote, orders, available_credit })
}

fn bulk_order(
    enterprise_id: Uuid,
    project: &EnterpriseProject,
    input: &BulkRemoval,
    quote: &EnterpriseQuote,
    fleet: Option<AssignedDriver>,
    index: u32,
) -> Order {
    let mut order = Order::new(
        CustomerRef { role: UserRole::Enterprise, id: enterprise_id },
        OrderType::WasteRemoval,
        OrderStatus::PendingPickup,
        project.location.clone(),
        MediaType::Image,
        String::new(),
    );
    order.payment_status = Some(PaymentStatus::Credit);
    order.pickup_details = Some(project_pickup(project));
    order.assigned_driver = fleet;
    order.analysis = Some(WasteAnalysis {
        waste_type: input.waste_type,
        estimated_weight_kg: 0.0,
        estimated_volume: "1 车".into(),
        estimated_price: quote.price_per_truck,
        description: format!("企业批量清运订单 ({index}/{}) - {}", input.trucks, project.name),
        recommended_vehicle: BULK_VEHICLE.into(),
        hazard_warning: None,
        is_bagged: false,
        is_collected: true,
        labor_service_recommendation: if input.services.labor {
            LaborServiceType::CarryAndLoad
        } else {
            LaborServiceType::None
        },
        recommended_collection_method: input.method,
    });
    order
}

fn project_pickup(project: &EnterpriseProject) -> PickupDetails {
    PickupDetails {
        city: "上海市".into(),
        district: "浦东新区".into(),
        street: project.address.clone(),
        community: project.name.clone(),
        is_collected: true,
        location_type: "GROUND_FLOOR".into(),
        project_name: Some(project.name.clone()),
        ..PickupDetails::default()
    }
}

// =============================================================================
// PROCUREMENT
// =============================================================================

/// Post a buy request for recycled material, delivered to the project.
///
/// # Errors
///
/// `Forbidden`, `MissingField`, `NotFound`, project lookups.
pub async fn procurement(
    state: &AppState,
    actor: Actor,
    enterprise_id: Uuid,
    input: Procurement,
) -> Result<Order, EnterpriseError> {
    require_self(actor, enterprise_id)?;
    if input.quantity.trim().is_empty() {
        return Err(EnterpriseError::MissingField("quantity"));
    }

    let mut store = state.store.write().await;
    let account = store.enterprises.get(&enterprise_id).ok_or(EnterpriseError::NotFound(enterprise_id))?;
    let project = approved_project(account, input.project_id)?;

    let mut order = Order::new(
        CustomerRef { role: UserRole::Enterprise, id: enterprise_id },
        OrderType::RecycleTrade,
        OrderStatus::PendingPickup,
        project.location.clone(),
        MediaType::Image,
        String::new(),
    );
    order.payment_status = Some(PaymentStatus::Credit);
    order.trade_direction = Some(TradeDirection::Buy);
    order.pickup_details = Some(project_pickup(&project));
    order.buy_requirements = Some(BuyRequirements {
        product_type: input.product_type,
        quantity: input.quantity.trim().to_string(),
        target_price: input.target_price,
    });
    store.orders.insert(order.id, order.clone());
    info!(%enterprise_id, order_id = %order.id, product = input.product_type.as_str(), "enterprise: procurement posted");
    Ok(order)
}

#[cfg(test)]
#[path = "enterprise_test.rs"]
mod tests;
