//! Property management: renovation permits, clearance dispatch to contracted
//! fleets, and monthly-bill tracking.

use rand::Rng;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::order::{FLEET_DISPATCH_NAME, PENDING_PLATE};
use crate::model::{
    Actor, ApplicantRole, AssignedDriver, CollectionMethod, CustomerRef, GeoLocation, LaborServiceType, MediaType,
    Order, OrderStatus, OrderType, PaymentStatus, PickupDetails, ProjectStatus, PropertyAccount, RenovationApplication,
    RenovationType, UserRole, WasteAnalysis, WasteType, now_ms,
};
use crate::state::AppState;

pub const CLEARANCE_PRICE: i64 = 450;
pub const SELF_RENOVATION: &str = "自装/散工";

#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("property account not found: {0}")]
    NotFound(Uuid),
    #[error("renovation application not found: {0}")]
    ApplicationNotFound(Uuid),
    #[error("application already reviewed")]
    AlreadyReviewed,
    #[error("community not managed: {0}")]
    CommunityNotManaged(String),
    #[error("supplier not found: {0}")]
    SupplierNotFound(Uuid),
    #[error("supplier contract inactive")]
    SupplierInactive,
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl crate::error::ErrorCode for PropertyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PROPERTY_NOT_FOUND",
            Self::ApplicationNotFound(_) => "E_APPLICATION_NOT_FOUND",
            Self::AlreadyReviewed => "E_ALREADY_REVIEWED",
            Self::CommunityNotManaged(_) => "E_COMMUNITY_NOT_MANAGED",
            Self::SupplierNotFound(_) => "E_SUPPLIER_NOT_FOUND",
            Self::SupplierInactive => "E_SUPPLIER_INACTIVE",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::Forbidden(_) => "E_FORBIDDEN",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRenovation {
    pub applicant_name: String,
    pub applicant_phone: String,
    pub applicant_role: ApplicantRole,
    #[serde(default = "default_renovation_type")]
    pub project_type: RenovationType,
    pub community_name: String,
    pub room_number: String,
    #[serde(default)]
    pub renovation_company: Option<String>,
    pub start_date: i64,
    pub estimated_duration_days: u32,
}

fn default_renovation_type() -> RenovationType {
    RenovationType::Residential
}

/// Clearance request for one flat.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clearance {
    pub community: String,
    pub building: String,
    #[serde(default)]
    pub unit: String,
    pub room: String,
    pub media: String,
    pub supplier_id: Uuid,
    /// Renovation the waste comes from; supplies the contractor name.
    #[serde(default)]
    pub application_id: Option<Uuid>,
}

fn property<'a>(accounts: &'a std::collections::HashMap<Uuid, PropertyAccount>, actor: Actor, id: Uuid) -> Result<&'a PropertyAccount, PropertyError> {
    if actor.role != UserRole::Property || actor.id != id {
        return Err(PropertyError::Forbidden("only the property manager can do this".into()));
    }
    accounts.get(&id).ok_or(PropertyError::NotFound(id))
}

// =============================================================================
// RENOVATION PERMITS
// =============================================================================

/// File a renovation application. Anyone may apply; it starts PENDING.
///
/// # Errors
///
/// `MissingField` for a blank community, room, or applicant.
pub async fn submit(state: &AppState, actor: Actor, input: NewRenovation) -> Result<RenovationApplication, PropertyError> {
    for (value, field) in [
        (&input.applicant_name, "applicantName"),
        (&input.community_name, "communityName"),
        (&input.room_number, "roomNumber"),
    ] {
        if value.trim().is_empty() {
            return Err(PropertyError::MissingField(field));
        }
    }
    let application = RenovationApplication {
        id: Uuid::new_v4(),
        applicant_id: actor.id,
        applicant_name: input.applicant_name,
        applicant_phone: input.applicant_phone,
        applicant_role: input.applicant_role,
        project_type: input.project_type,
        community_name: input.community_name.trim().to_string(),
        room_number: input.room_number.trim().to_string(),
        renovation_company: input.renovation_company.filter(|c| !c.trim().is_empty()),
        start_date: input.start_date,
        estimated_duration_days: input.estimated_duration_days,
        status: ProjectStatus::Pending,
        created_at: now_ms(),
        permit_id: None,
    };
    state.store.write().await.renovations.insert(application.id, application.clone());
    info!(application_id = %application.id, community = %application.community_name, "property: renovation submitted");
    Ok(application)
}

/// Residential applications in the manager's communities with `status`,
/// newest first.
///
/// # Errors
///
/// `Forbidden`, `NotFound`.
pub async fn applications(
    state: &AppState,
    actor: Actor,
    property_id: Uuid,
    status: ProjectStatus,
) -> Result<Vec<RenovationApplication>, PropertyError> {
    let store = state.store.read().await;
    let account = property(&store.properties, actor, property_id)?;
    let mut apps: Vec<RenovationApplication> = store
        .renovations
        .values()
        .filter(|a| a.project_type == RenovationType::Residential)
        .filter(|a| a.status == status && account.manages(&a.community_name))
        .cloned()
        .collect();
    apps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(apps)
}

/// Approve a pending application and issue its permit number.
///
/// # Errors
///
/// `Forbidden`, `ApplicationNotFound`, `CommunityNotManaged`,
/// `AlreadyReviewed`.
pub async fn approve(state: &AppState, actor: Actor, application_id: Uuid) -> Result<RenovationApplication, PropertyError> {
    review(state, actor, application_id, true).await
}

/// # Errors
///
/// As [`approve`].
pub async fn reject(state: &AppState, actor: Actor, application_id: Uuid) -> Result<RenovationApplication, PropertyError> {
    review(state, actor, application_id, false).await
}

async fn review(state: &AppState, actor: Actor, application_id: Uuid, approve: bool) -> Result<RenovationApplication, PropertyError> {
    let mut store = state.store.write().await;
    let account = property(&store.properties, actor, actor.id)?.clone();
    let app = store
        .renovations
        .get_mut(&application_id)
        .ok_or(PropertyError::ApplicationNotFound(application_id))?;
    if !account.manages(&app.community_name) {
        return Err(PropertyError::CommunityNotManaged(app.community_name.clone()));
    }
    if app.status != ProjectStatus::Pending {
        return Err(PropertyError::AlreadyReviewed);
    }
    if approve {
        app.status = ProjectStatus::Approved;
        app.permit_id = Some(permit_id());
    } else {
        app.status = ProjectStatus::Rejected;
    }
    info!(%application_id, status = ?app.status, permit = ?app.permit_id, "property: renovation reviewed");
    Ok(app.clone())
}

/// `PMT-<year>-<4 digits>`.
fn permit_id() -> String {
    let year = time::OffsetDateTime::now_utc().year();
    let n: u32 = rand::rng().random_range(0..10_000);
    format!("PMT-{year}-{n:04}")
}

// =============================================================================
// CLEARANCE
// =============================================================================

/// Report renovation waste at a flat and hand it to a contracted fleet.
/// The order waits in ANALYZING for the manager to confirm.
///
/// # Errors
///
/// `Forbidden`, `MissingField`, `CommunityNotManaged`, `SupplierNotFound`,
/// `SupplierInactive`.
pub async fn dispatch_clearance(state: &AppState, actor: Actor, property_id: Uuid, input: Clearance) -> Result<Order, PropertyError> {
    if input.building.trim().is_empty() {
        return Err(PropertyError::MissingField("building"));
    }
    if input.room.trim().is_empty() {
        return Err(PropertyError::MissingField("room"));
    }
    if input.media.trim().is_empty() {
        return Err(PropertyError::MissingField("media"));
    }

    let mut store = state.store.write().await;
    let account = property(&store.properties, actor, property_id)?;
    if !account.manages(&input.community) {
        return Err(PropertyError::CommunityNotManaged(input.community));
    }
    let supplier = account
        .suppliers
        .iter()
        .find(|s| s.id == input.supplier_id)
        .ok_or(PropertyError::SupplierNotFound(input.supplier_id))?;
    if !supplier.active {
        return Err(PropertyError::SupplierInactive);
    }
    let assigned = AssignedDriver {
        driver_id: None,
        name: FLEET_DISPATCH_NAME.into(),
        phone: supplier.phone.clone(),
        plate: PENDING_PLATE.into(),
        fleet_name: Some(supplier.name.clone()),
        fleet_id: Some(supplier.id),
    };
    let contractor = input
        .application_id
        .and_then(|id| store.renovations.get(&id))
        .and_then(|a| a.renovation_company.clone())
        .unwrap_or_else(|| SELF_RENOVATION.to_string());

    let address = format!("{} {}-{}-{}", input.community, input.building, input.unit, input.room);
    let mut order = Order::new(
        CustomerRef { role: UserRole::Property, id: property_id },
        OrderType::WasteRemoval,
        OrderStatus::Analyzing,
        GeoLocation::at(31.22, 121.48, address),
        MediaType::Image,
        input.media,
    );
    order.pickup_details = Some(PickupDetails {
        city: "上海市".into(),
        district: "浦东新区".into(),
        street: input.community.clone(),
        community: input.community.clone(),
        is_collected: true,
        location_type: "GROUND_FLOOR".into(),
        building: Some(input.building.clone()),
        unit: Some(input.unit),
        room_number: Some(input.room.clone()),
        contractor_name: Some(contractor),
        project_name: None,
    });
    order.payment_status = Some(PaymentStatus::MonthlyBill);
    order.assigned_driver = Some(assigned);
    order.analysis = Some(WasteAnalysis {
        waste_type: WasteType::Construction,
        estimated_weight_kg: 0.0,
        estimated_volume: "待估".into(),
        estimated_price: CLEARANCE_PRICE,
        description: format!("物业代报: {}栋{}", input.building, input.room),
        recommended_vehicle: "Truck".into(),
        hazard_warning: None,
        is_bagged: false,
        is_collected: true,
        labor_service_recommendation: LaborServiceType::None,
        recommended_collection_method: CollectionMethod::Immediate,
    });

    store.orders.insert(order.id, order.clone());
    info!(order_id = %order.id, %property_id, supplier_id = %input.supplier_id, community = %input.community, "property: clearance dispatched");
    Ok(order)
}

// =============================================================================
// BILLING
// =============================================================================

/// Orders picked up in the manager's communities, newest first.
///
/// # Errors
///
/// `Forbidden`, `NotFound`.
pub async fn community_orders(state: &AppState, actor: Actor, property_id: Uuid) -> Result<Vec<Order>, PropertyError> {
    let store = state.store.read().await;
    let account = property(&store.properties, actor, property_id)?;
    Ok(store
        .orders_newest_first()
        .into_iter()
        .filter(|o| o.pickup_details.as_ref().is_some_and(|p| account.manages(&p.community)))
        .cloned()
        .collect())
}

/// Monthly-bill amount still open across the manager's communities.
///
/// # Errors
///
/// `Forbidden`, `NotFound`.
pub async fn unsettled_amount(state: &AppState, actor: Actor, property_id: Uuid) -> Result<i64, PropertyError> {
    Ok(community_orders(state, actor, property_id)
        .await?
        .iter()
        .filter(|o| o.payment_status == Some(PaymentStatus::MonthlyBill) && o.status != OrderStatus::Completed)
        .map(Order::estimated_price)
        .sum())
}

#[cfg(test)]
#[path = "property_test.rs"]
mod tests;
