//! Order lifecycle: creation, the legal-transition table, and role views.
//!
//! DESIGN
//! ======
//! Every status change goes through [`authorize`], which consults the
//! transition table in [`allowed_roles`]: an edge missing from the table is
//! `IllegalTransition`, an edge taken by the wrong role is `Forbidden`.
//! Accepted changes are appended to the order's history by [`apply`].
//!
//! Each operation takes the store write lock once, validates, and mutates.
//! Operations that classify media snapshot what they need, release the lock
//! for the model call, and re-acquire it to insert.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::ai::split_data_url;
use super::classify;
use super::manifest::{self, Settlement};
use super::pricing;
use crate::model::{
    Actor, AssignedDriver, AssignedWorker, CustomerRef, DisposalRecord, GeoLocation, Manifest, MediaType, Order,
    OrderStatus, OrderType, PaymentStatus, PickupDetails, ProjectStatus, SettlementMethod, SettlementStatus,
    StatusChange, TradeSupplier, UserRole, VerificationStatus, WasteType, now_ms,
};
use crate::state::{AppState, Store};

/// Plate shown on a fleet-grabbed order until a driver is chosen.
pub const PENDING_PLATE: &str = "待指派";
pub const FLEET_DISPATCH_NAME: &str = "车队调度中";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order not found: {0}")]
    NotFound(Uuid),
    #[error("illegal transition {from} -> {to} for {order_type:?}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus, order_type: OrderType },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("transition {from} -> {to} has its own operation")]
    DedicatedOperation { from: OrderStatus, to: OrderStatus },
    #[error("order type {0:?} cannot be created this way")]
    UnsupportedOrderType(OrderType),
    #[error("media is required")]
    MissingMedia,
    #[error("photo is required")]
    MissingPhoto,
    #[error("order already assigned")]
    AlreadyAssigned,
    #[error("driver not found: {0}")]
    DriverNotFound(Uuid),
    #[error("driver is not verified")]
    DriverNotVerified,
    #[error("driver already has an active order")]
    DriverBusy,
    #[error("driver does not belong to this fleet")]
    DriverNotInFleet,
    #[error("fleet not found: {0}")]
    FleetNotFound(Uuid),
    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),
    #[error("project is not approved")]
    ProjectNotApproved,
    #[error("worker not found: {0}")]
    WorkerNotFound(Uuid),
    #[error("worker is not verified")]
    WorkerNotVerified,
    #[error("facility not found: {0}")]
    FacilityNotFound(Uuid),
    #[error("facility is full")]
    FacilityFull,
    #[error("facility does not accept {0:?}")]
    WasteNotAccepted(WasteType),
}

impl crate::error::ErrorCode for OrderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_ORDER_NOT_FOUND",
            Self::IllegalTransition { .. } => "E_ILLEGAL_TRANSITION",
            Self::Forbidden(_) => "E_FORBIDDEN",
            Self::DedicatedOperation { .. } => "E_DEDICATED_OPERATION",
            Self::UnsupportedOrderType(_) => "E_UNSUPPORTED_ORDER_TYPE",
            Self::MissingMedia => "E_MISSING_MEDIA",
            Self::MissingPhoto => "E_MISSING_PHOTO",
            Self::AlreadyAssigned => "E_ALREADY_ASSIGNED",
            Self::DriverNotFound(_) => "E_DRIVER_NOT_FOUND",
            Self::DriverNotVerified => "E_DRIVER_NOT_VERIFIED",
            Self::DriverBusy => "E_DRIVER_BUSY",
            Self::DriverNotInFleet => "E_DRIVER_NOT_IN_FLEET",
            Self::FleetNotFound(_) => "E_FLEET_NOT_FOUND",
            Self::ProjectNotFound(_) => "E_PROJECT_NOT_FOUND",
            Self::ProjectNotApproved => "E_PROJECT_NOT_APPROVED",
            Self::WorkerNotFound(_) => "E_WORKER_NOT_FOUND",
            Self::WorkerNotVerified => "E_WORKER_NOT_VERIFIED",
            Self::FacilityNotFound(_) => "E_FACILITY_NOT_FOUND",
            Self::FacilityFull => "E_FACILITY_FULL",
            Self::WasteNotAccepted(_) => "E_WASTE_NOT_ACCEPTED",
        }
    }
}

/// Body of a media-backed order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Raw base64 or a data URL.
    pub media: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub note: Option<String>,
    pub location: GeoLocation,
    #[serde(default)]
    pub pickup_details: Option<PickupDetails>,
    #[serde(default)]
    pub order_type: Option<OrderType>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfOrder {
    pub project_id: Uuid,
    pub media: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// A created order plus whether its analysis is the fallback record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order: Order,
    pub fallback: bool,
}

/// Order plus the manifest issued on completion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedOrder {
    pub order: Order,
    pub manifest: Manifest,
}

/// Role-specific slices of the order book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderView {
    #[default]
    All,
    /// Orders the caller placed, carries, or disposed of.
    Mine,
    DriverPool,
    FleetPool,
    FleetDispatch,
    WorkerHall,
    FacilityQueue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderFilter {
    pub view: OrderView,
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
    pub customer_id: Option<Uuid>,
    pub fleet_id: Option<Uuid>,
    pub driver_plate: Option<String>,
    pub worker_id: Option<Uuid>,
}

// =============================================================================
// TRANSITION TABLE
// =============================================================================

/// Roles allowed to move an order of `order_type` from `from` to `to`, or
/// `None` when the edge does not exist. `owner` is the role that placed it.
#[must_use]
pub fn allowed_roles(order_type: OrderType, owner: UserRole, from: OrderStatus, to: OrderStatus) -> Option<Vec<UserRole>> {
    use OrderStatus as S;

    let removal = order_type == OrderType::WasteRemoval;
    match (from, to) {
        (S::Created, S::Analyzing | S::ReviewRequired | S::PendingPickup)
        | (S::Analyzing, S::ReviewRequired | S::PendingPickup)
        | (S::ReviewRequired, S::PendingPickup) => Some(vec![owner]),
        (S::PendingPickup, S::InProgress) => Some(match order_type {
            OrderType::WasteRemoval => vec![UserRole::Driver, UserRole::Fleet],
            OrderType::Demolition | OrderType::Labor => vec![UserRole::Worker],
            OrderType::RecycleTrade => vec![UserRole::Disposal],
        }),
        (S::InProgress, S::ArrivedPickup) if removal => Some(vec![UserRole::Driver, UserRole::Fleet]),
        (S::ArrivedPickup, S::LoadingComplete) | (S::LoadingComplete, S::ArrivedDisposal) if removal => {
            Some(vec![UserRole::Driver])
        }
        (S::LoadingComplete | S::ArrivedDisposal, S::Completed) if removal => Some(vec![UserRole::Disposal]),
        (S::InProgress, S::Completed) => match order_type {
            OrderType::Demolition | OrderType::Labor => Some(vec![UserRole::Worker]),
            OrderType::RecycleTrade => Some(vec![UserRole::Disposal]),
            OrderType::WasteRemoval => None,
        },
        _ => None,
    }
}

/// Check `role` may move `order` to `to`.
///
/// # Errors
///
/// `IllegalTransition` when the edge does not exist, `Forbidden` when the
/// role is not allowed on it.
pub fn authorize(order: &Order, role: UserRole, to: OrderStatus) -> Result<(), OrderError> {
    let Some(roles) = allowed_roles(order.order_type, order.customer.role, order.status, to) else {
        return Err(OrderError::IllegalTransition { from: order.status, to, order_type: order.order_type });
    };
    if !roles.contains(&role) {
        return Err(OrderError::Forbidden(format!("{role} cannot move {} -> {to}", order.status)));
    }
    Ok(())
}

/// Record the change and set the new status. Call after [`authorize`].
pub fn apply(order: &mut Order, role: UserRole, to: OrderStatus) {
    info!(order_id = %order.id, from = %order.status, %to, %role, "order: status changed");
    order.history.push(StatusChange { from: order.status, to, role, at: now_ms() });
    order.status = to;
}

fn require_owner(order: &Order, actor: Actor) -> Result<(), OrderError> {
    if order.customer.role == actor.role && order.customer.id == actor.id {
        Ok(())
    } else {
        Err(OrderError::Forbidden("only the customer who placed the order can do this".into()))
    }
}

fn order_mut(store: &mut Store, id: Uuid) -> Result<&mut Order, OrderError> {
    store.orders.get_mut(&id).ok_or(OrderError::NotFound(id))
}

// =============================================================================
// CREATION
// =============================================================================

/// Classify the media and create an order awaiting customer review.
///
/// A worker's post whose classification fell back stays in ANALYZING.
///
/// # Errors
///
/// `Forbidden` for roles that cannot place orders, `MissingMedia`, or
/// `UnsupportedOrderType` for trade orders.
pub async fn create_from_media(state: &AppState, actor: Actor, input: NewOrder) -> Result<CreatedOrder, OrderError> {
    if !matches!(actor.role, UserRole::Client | UserRole::Worker | UserRole::Property | UserRole::Enterprise) {
        return Err(OrderError::Forbidden(format!("{} cannot place orders", actor.role)));
    }
    let order_type = input.order_type.unwrap_or(OrderType::WasteRemoval);
    if order_type == OrderType::RecycleTrade {
        return Err(OrderError::UnsupportedOrderType(order_type));
    }
    if input.media.trim().is_empty() {
        return Err(OrderError::MissingMedia);
    }

    let mime = input
        .mime_type
        .clone()
        .or_else(|| split_data_url(&input.media).0.map(str::to_string));
    let media_type = input
        .media_type
        .or_else(|| mime.as_deref().map(MediaType::from_mime))
        .unwrap_or(MediaType::Image);

    let classified = classify::analyze_waste(
        state,
        actor.id,
        &input.media,
        media_type,
        mime.as_deref(),
        input.note.as_deref(),
    )
    .await;

    let status = if actor.role == UserRole::Worker && classified.fallback {
        OrderStatus::Analyzing
    } else {
        OrderStatus::ReviewRequired
    };

    let mut order = Order::new(
        CustomerRef { role: actor.role, id: actor.id },
        order_type,
        status,
        input.location,
        media_type,
        input.media,
    );
    order.pickup_details = input.pickup_details;
    order.analysis = Some(classified.result);
    order.payment_status = Some(if actor.role == UserRole::Property {
        PaymentStatus::MonthlyBill
    } else {
        PaymentStatus::Unpaid
    });

    info!(order_id = %order.id, role = %actor.role, ?order_type, %status, fallback = classified.fallback, "order: created");
    let mut store = state.store.write().await;
    store.orders.insert(order.id, order.clone());
    Ok(CreatedOrder { order, fallback: classified.fallback })
}

/// A driver starts a haul from one of their fleet's projects. The order
/// begins at ARRIVED_PICKUP with the driver assigned.
///
/// # Errors
///
/// Driver, fleet, and project lookups; `DriverNotVerified`, `DriverBusy`,
/// `ProjectNotApproved`, `MissingMedia`.
pub async fn driver_self_order(state: &AppState, actor: Actor, input: SelfOrder) -> Result<CreatedOrder, OrderError> {
    if actor.role != UserRole::Driver {
        return Err(OrderError::Forbidden("only drivers can start self orders".into()));
    }
    if input.media.trim().is_empty() {
        return Err(OrderError::MissingMedia);
    }

    let (assigned, project_name, project_address) = {
        let store = state.store.read().await;
        let driver = store.drivers.get(&actor.id).ok_or(OrderError::DriverNotFound(actor.id))?;
        if driver.status != VerificationStatus::Verified {
            return Err(OrderError::DriverNotVerified);
        }
        if driver_has_active_order(&store, actor.id) {
            return Err(OrderError::DriverBusy);
        }
        let fleet_id = driver.fleet_id.ok_or(OrderError::DriverNotInFleet)?;
        let fleet = store.fleets.get(&fleet_id).ok_or(OrderError::FleetNotFound(fleet_id))?;
        let project = fleet
            .projects
            .iter()
            .find(|p| p.id == input.project_id)
            .ok_or(OrderError::ProjectNotFound(input.project_id))?;
        if project.status != ProjectStatus::Approved {
            return Err(OrderError::ProjectNotApproved);
        }
        (assigned_from_driver(driver, Some(fleet.name.clone())), project.name.clone(), project.address.clone())
    };

    let (url_mime, _) = split_data_url(&input.media);
    let mime = input.mime_type.as_deref().or(url_mime);
    let classified = classify::analyze_waste(state, actor.id, &input.media, MediaType::Image, mime, None).await;

    let mut order = Order::new(
        CustomerRef { role: UserRole::Driver, id: actor.id },
        OrderType::WasteRemoval,
        OrderStatus::ArrivedPickup,
        GeoLocation::at(31.22, 121.48, project_address.clone()),
        MediaType::Image,
        input.media,
    );
    order.pickup_details = Some(PickupDetails {
        city: "上海市".into(),
        district: "浦东新区".into(),
        street: project_address,
        community: project_name.clone(),
        is_collected: true,
        location_type: "CONSTRUCTION_SITE".into(),
        project_name: Some(project_name),
        ..PickupDetails::default()
    });
    order.assigned_driver = Some(assigned);
    order.analysis = Some(classified.result);
    order.payment_status = Some(PaymentStatus::Unpaid);

    let mut store = state.store.write().await;
    // Another haul may have started while the model was classifying.
    if driver_has_active_order(&store, actor.id) {
        return Err(OrderError::DriverBusy);
    }
    info!(order_id = %order.id, driver_id = %actor.id, "order: driver self order started");
    store.orders.insert(order.id, order.clone());
    Ok(CreatedOrder { order, fallback: classified.fallback })
}

fn assigned_from_driver(driver: &crate::model::Driver, fleet_name: Option<String>) -> AssignedDriver {
    AssignedDriver {
        driver_id: Some(driver.id),
        name: driver.name.clone(),
        phone: driver.phone.clone(),
        plate: driver.vehicle_plate.clone(),
        fleet_name: fleet_name.or_else(|| driver.fleet_name.clone()),
        fleet_id: driver.fleet_id,
    }
}

// =============================================================================
// CUSTOMER
// =============================================================================

/// Customer accepts the analysis and releases the order for pickup.
///
/// # Errors
///
/// `NotFound`, `Forbidden` for anyone but the customer, `IllegalTransition`
/// once the order is past review.
pub async fn confirm(state: &AppState, actor: Actor, order_id: Uuid) -> Result<Order, OrderError> {
    let mut store = state.store.write().await;
    let order = order_mut(&mut store, order_id)?;
    authorize(order, actor.role, OrderStatus::PendingPickup)?;
    require_owner(order, actor)?;
    apply(order, actor.role, OrderStatus::PendingPickup);
    Ok(order.clone())
}

// =============================================================================
// DRIVERS & FLEETS
// =============================================================================

fn driver_has_active_order(store: &Store, driver_id: Uuid) -> bool {
    store.orders.values().any(|o| {
        o.assigned_driver.as_ref().and_then(|d| d.driver_id) == Some(driver_id)
            && matches!(
                o.status,
                OrderStatus::InProgress
                    | OrderStatus::ArrivedPickup
                    | OrderStatus::LoadingComplete
                    | OrderStatus::ArrivedDisposal
            )
    })
}

/// A verified driver takes an unassigned order from the pool.
///
/// # Errors
///
/// `DriverNotVerified`, `DriverBusy`, `AlreadyAssigned`, and transition errors.
pub async fn driver_accept(state: &AppState, actor: Actor, order_id: Uuid) -> Result<Order, OrderError> {
    if actor.role != UserRole::Driver {
        return Err(OrderError::Forbidden("only drivers can accept from the pool".into()));
    }
    let mut store = state.store.write().await;
    let driver = store.drivers.get(&actor.id).ok_or(OrderError::DriverNotFound(actor.id))?;
    if driver.status != VerificationStatus::Verified {
        return Err(OrderError::DriverNotVerified);
    }
    let assigned = assigned_from_driver(driver, None);
    if driver_has_active_order(&store, actor.id) {
        return Err(OrderError::DriverBusy);
    }

    let order = order_mut(&mut store, order_id)?;
    authorize(order, actor.role, OrderStatus::InProgress)?;
    if order.assigned_driver.is_some() {
        return Err(OrderError::AlreadyAssigned);
    }
    order.assigned_driver = Some(assigned);
    apply(order, actor.role, OrderStatus::InProgress);
    Ok(order.clone())
}

/// A fleet claims a pool order for internal dispatch. Status stays
/// PENDING_PICKUP until [`fleet_assign`].
///
/// # Errors
///
/// `FleetNotFound`, `AlreadyAssigned`, or `IllegalTransition` when the
/// order is not a pending removal.
pub async fn fleet_grab(state: &AppState, actor: Actor, order_id: Uuid) -> Result<Order, OrderError> {
    if actor.role != UserRole::Fleet {
        return Err(OrderError::Forbidden("only fleets can grab orders".into()));
    }
    let mut store = state.store.write().await;
    let fleet_name = store
        .fleets
        .get(&actor.id)
        .map(|f| f.name.clone())
        .ok_or(OrderError::FleetNotFound(actor.id))?;

    let order = order_mut(&mut store, order_id)?;
    if order.status != OrderStatus::PendingPickup || order.order_type != OrderType::WasteRemoval {
        return Err(OrderError::IllegalTransition {
            from: order.status,
            to: OrderStatus::PendingPickup,
            order_type: order.order_type,
        });
    }
    if order.assigned_driver.is_some() {
        return Err(OrderError::AlreadyAssigned);
    }
    order.assigned_driver = Some(AssignedDriver {
        driver_id: None,
        name: FLEET_DISPATCH_NAME.into(),
        phone: String::new(),
        plate: PENDING_PLATE.into(),
        fleet_name: Some(fleet_name),
        fleet_id: Some(actor.id),
    });
    info!(%order_id, fleet_id = %actor.id, "order: grabbed by fleet");
    Ok(order.clone())
}

/// A fleet hands one of its grabbed orders to one of its drivers.
///
/// # Errors
///
/// `Forbidden` for another fleet's order, `DriverNotInFleet`,
/// `DriverNotVerified`, `DriverBusy`, `AlreadyAssigned`.
pub async fn fleet_assign(state: &AppState, actor: Actor, order_id: Uuid, driver_id: Uuid) -> Result<Order, OrderError> {
    let mut store = state.store.write().await;
    let driver = store.drivers.get(&driver_id).ok_or(OrderError::DriverNotFound(driver_id))?;
    if driver.fleet_id != Some(actor.id) {
        return Err(OrderError::DriverNotInFleet);
    }
    if driver.status != VerificationStatus::Verified {
        return Err(OrderError::DriverNotVerified);
    }
    let fleet_name = store.fleets.get(&actor.id).map(|f| f.name.clone());
    let assigned = assigned_from_driver(driver, fleet_name);
    if driver_has_active_order(&store, driver_id) {
        return Err(OrderError::DriverBusy);
    }

    let order = order_mut(&mut store, order_id)?;
    authorize(order, actor.role, OrderStatus::InProgress)?;
    if order.fleet_id() != Some(actor.id) {
        return Err(OrderError::Forbidden("order was not grabbed by this fleet".into()));
    }
    if order.has_driver() {
        return Err(OrderError::AlreadyAssigned);
    }
    order.assigned_driver = Some(assigned);
    apply(order, actor.role, OrderStatus::InProgress);
    Ok(order.clone())
}

/// Step an order forward outside the dedicated operations: the driver's
/// pickup steps, a fleet marking arrival, and facilities fulfilling trades.
///
/// # Errors
///
/// Transition errors, `Forbidden` when the caller is not the order's
/// driver or fleet (or, for trades, the facility that took it on),
/// `FacilityNotFound`, `MissingPhoto` for LOADING_COMPLETE, and
/// `DedicatedOperation` for edges handled elsewhere.
pub async fn advance(
    state: &AppState,
    actor: Actor,
    order_id: Uuid,
    to: OrderStatus,
    loading_photo: Option<String>,
) -> Result<Order, OrderError> {
    use OrderStatus as S;

    let mut store = state.store.write().await;
    let caller_facility = store.facilities.get(&actor.id).map(|f| f.name.clone());
    let order = order_mut(&mut store, order_id)?;
    authorize(order, actor.role, to)?;

    match (order.order_type, order.status, to) {
        (OrderType::WasteRemoval, from, S::Completed) => return Err(OrderError::DedicatedOperation { from, to }),
        (OrderType::WasteRemoval, S::InProgress | S::ArrivedPickup | S::LoadingComplete, _) => {
            let carries = match actor.role {
                UserRole::Driver => order.assigned_driver.as_ref().and_then(|d| d.driver_id) == Some(actor.id),
                UserRole::Fleet => order.fleet_id() == Some(actor.id),
                _ => false,
            };
            if !carries {
                return Err(OrderError::Forbidden("order is not assigned to you".into()));
            }
            if to == S::LoadingComplete {
                let photo = loading_photo.filter(|p| !p.trim().is_empty()).ok_or(OrderError::MissingPhoto)?;
                order.loading_photo = Some(photo);
            }
        }
        (OrderType::RecycleTrade, S::PendingPickup, _) => {
            let facility_name = caller_facility.ok_or(OrderError::FacilityNotFound(actor.id))?;
            order.trade_supplier = Some(TradeSupplier { facility_id: actor.id, facility_name });
        }
        (OrderType::RecycleTrade, S::InProgress, _) => {
            if order.trade_supplier.as_ref().map(|t| t.facility_id) != Some(actor.id) {
                return Err(OrderError::Forbidden("trade is being fulfilled by another facility".into()));
            }
        }
        (_, from, _) => return Err(OrderError::DedicatedOperation { from, to }),
    }

    apply(order, actor.role, to);
    Ok(order.clone())
}

// =============================================================================
// WORKERS
// =============================================================================

/// A verified worker takes a demolition or labour job from the hall.
///
/// # Errors
///
/// `WorkerNotVerified`, `AlreadyAssigned`, and transition errors.
pub async fn worker_accept(state: &AppState, actor: Actor, order_id: Uuid) -> Result<Order, OrderError> {
    let mut store = state.store.write().await;
    let worker = store.workers.get(&actor.id).ok_or(OrderError::WorkerNotFound(actor.id))?;
    if worker.status != VerificationStatus::Verified {
        return Err(OrderError::WorkerNotVerified);
    }
    let assigned = AssignedWorker {
        worker_id: worker.id,
        name: worker.name.clone(),
        phone: worker.phone.clone(),
        team_name: worker.team_name.clone(),
    };

    let order = order_mut(&mut store, order_id)?;
    authorize(order, actor.role, OrderStatus::InProgress)?;
    if order.assigned_worker.is_some() {
        return Err(OrderError::AlreadyAssigned);
    }
    order.assigned_worker = Some(assigned);
    apply(order, actor.role, OrderStatus::InProgress);
    Ok(order.clone())
}

/// # Errors
///
/// `Forbidden` unless the caller is the assigned worker; transition errors.
pub async fn worker_complete(state: &AppState, actor: Actor, order_id: Uuid) -> Result<Order, OrderError> {
    let mut store = state.store.write().await;
    let order = order_mut(&mut store, order_id)?;
    authorize(order, actor.role, OrderStatus::Completed)?;
    if order.assigned_worker.as_ref().map(|w| w.worker_id) != Some(actor.id) {
        return Err(OrderError::Forbidden("order is not assigned to you".into()));
    }
    apply(order, actor.role, OrderStatus::Completed);
    Ok(order.clone())
}

// =============================================================================
// DISPOSAL
// =============================================================================

/// Facility admits a loaded truck: checks capacity and waste policy,
/// settles the gate fee, issues the manifest, and completes the order.
///
/// # Errors
///
/// `FacilityNotFound`, `MissingPhoto`, `FacilityFull`, `WasteNotAccepted`,
/// and transition errors.
pub async fn confirm_disposal_entry(
    state: &AppState,
    actor: Actor,
    order_id: Uuid,
    entry_photo: &str,
) -> Result<CompletedOrder, OrderError> {
    let mut store = state.store.write().await;
    let facility = store
        .facilities
        .get(&actor.id)
        .cloned()
        .ok_or(OrderError::FacilityNotFound(actor.id))?;

    let order = store.orders.get(&order_id).ok_or(OrderError::NotFound(order_id))?;
    authorize(order, actor.role, OrderStatus::Completed)?;
    if entry_photo.trim().is_empty() {
        return Err(OrderError::MissingPhoto);
    }
    if facility.is_full() {
        return Err(OrderError::FacilityFull);
    }
    let waste_type = order
        .analysis
        .as_ref()
        .map_or(WasteType::Unknown, |a| a.waste_type);
    if !facility.accepts(waste_type) {
        return Err(OrderError::WasteNotAccepted(waste_type));
    }

    let method = if order.customer.role.is_account_customer() || order.payment_status == Some(PaymentStatus::MonthlyBill) {
        SettlementMethod::Platform
    } else {
        SettlementMethod::Direct
    };
    let settlement = Settlement {
        waste_type,
        fee: pricing::disposal_fee(&facility, waste_type),
        method,
        status: match method {
            SettlementMethod::Platform => SettlementStatus::PendingPlatform,
            SettlementMethod::Direct => SettlementStatus::Paid,
        },
    };

    let snapshot = order.clone();
    let manifest = manifest::issue(&mut store, &snapshot, &facility, settlement);

    let order = order_mut(&mut store, order_id)?;
    order.disposal = Some(DisposalRecord {
        facility_id: facility.id,
        facility_name: facility.name.clone(),
        fee: settlement.fee,
        settlement_method: settlement.method,
        settlement_status: settlement.status,
        entry_photo: entry_photo.to_string(),
    });
    order.manifest_serial_no = Some(manifest.serial_no.clone());
    apply(order, actor.role, OrderStatus::Completed);
    info!(%order_id, facility_id = %facility.id, serial = %manifest.serial_no, fee = settlement.fee, "order: disposal confirmed");

    Ok(CompletedOrder { order: order.clone(), manifest })
}

// =============================================================================
// QUERIES
// =============================================================================

/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn get(state: &AppState, order_id: Uuid) -> Result<Order, OrderError> {
    let store = state.store.read().await;
    store.orders.get(&order_id).cloned().ok_or(OrderError::NotFound(order_id))
}

/// Orders matching `filter`, newest first. Views are resolved against the
/// calling actor.
pub async fn list(state: &AppState, actor: Actor, filter: &OrderFilter) -> Vec<Order> {
    let store = state.store.read().await;
    store
        .orders_newest_first()
        .into_iter()
        .filter(|o| in_view(o, filter.view, actor))
        .filter(|o| matches_filter(o, filter))
        .cloned()
        .collect()
}

fn in_view(order: &Order, view: OrderView, actor: Actor) -> bool {
    match view {
        OrderView::All => true,
        OrderView::Mine => involves(order, actor.id),
        OrderView::DriverPool => order.status == OrderStatus::PendingPickup
            && order.order_type == OrderType::WasteRemoval
            && order.assigned_driver.is_none(),
        OrderView::FleetPool => order.status == OrderStatus::PendingPickup
            && order.order_type == OrderType::WasteRemoval
            && order.fleet_id().is_none()
            && !order.has_driver(),
        OrderView::FleetDispatch => order.status == OrderStatus::PendingPickup
            && order.fleet_id() == Some(actor.id)
            && !order.has_driver(),
        OrderView::WorkerHall => order.status == OrderStatus::PendingPickup
            && order.order_type.is_crew_job()
            && order.assigned_worker.is_none(),
        OrderView::FacilityQueue => matches!(order.status, OrderStatus::LoadingComplete | OrderStatus::ArrivedDisposal),
    }
}

fn involves(order: &Order, id: Uuid) -> bool {
    order.customer.id == id
        || order.fleet_id() == Some(id)
        || order.assigned_driver.as_ref().and_then(|d| d.driver_id) == Some(id)
        || order.assigned_worker.as_ref().map(|w| w.worker_id) == Some(id)
        || order.disposal.as_ref().map(|d| d.facility_id) == Some(id)
        || order.trade_supplier.as_ref().map(|t| t.facility_id) == Some(id)
}

fn matches_filter(order: &Order, filter: &OrderFilter) -> bool {
    filter.status.is_none_or(|s| order.status == s)
        && filter.order_type.is_none_or(|t| order.order_type == t)
        && filter.customer_id.is_none_or(|c| order.customer.id == c)
        && filter.fleet_id.is_none_or(|f| order.fleet_id() == Some(f))
        && filter
            .driver_plate
            .as_deref()
            .is_none_or(|p| order.assigned_driver.as_ref().is_some_and(|d| d.plate == p))
        && filter
            .worker_id
            .is_none_or(|w| order.assigned_worker.as_ref().is_some_and(|a| a.worker_id == w))
}

#[cfg(test)]
#[path = "order_test.rs"]
mod tests;
