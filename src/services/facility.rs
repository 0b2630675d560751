//! Facility profiles, capacity status, settlement, and disposal history.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::model::{
    Actor, Facility, FacilityOperationalStatus, FacilityType, FeeConfig, Notice, NoticeKind, Order, OrderStatus,
    SettlementMethod, SettlementStatus, UserRole, WasteType, now_ms,
};
use crate::state::{AppState, Store};

pub const FULL_ALERT_CONTENT: &str = "【紧急】该消纳场库容已达极限，已停止接纳新运单。";

#[derive(Debug, thiserror::Error)]
pub enum FacilityError {
    #[error("facility not found: {0}")]
    NotFound(Uuid),
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl crate::error::ErrorCode for FacilityError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_FACILITY_NOT_FOUND",
            Self::Forbidden(_) => "E_FORBIDDEN",
        }
    }
}

/// Editable profile fields. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacilityUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_phone: Option<String>,
    pub facility_type: Option<FacilityType>,
    pub specialty: Option<String>,
    pub allowed_waste_types: Option<Vec<WasteType>>,
    pub fee_configs: Option<Vec<FeeConfig>>,
    pub preferred_settlement: Option<SettlementMethod>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSummary {
    pub pending_platform: i64,
    pub direct: i64,
    pub paid: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementFilter {
    #[default]
    All,
    Pending,
    Paid,
}

/// Marketing notice a facility pushes to drivers and fleets.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Promotion {
    /// Gate fee cut to `price` per truck.
    Discount { price: i64, reason: String },
    /// Call for spare haulage capacity.
    Request { reason: String },
}

fn require_self(actor: Actor, facility_id: Uuid) -> Result<(), FacilityError> {
    if actor.role == UserRole::Disposal && actor.id == facility_id {
        Ok(())
    } else {
        Err(FacilityError::Forbidden("only the facility itself can do this".into()))
    }
}

fn facility_mut(store: &mut Store, id: Uuid) -> Result<&mut Facility, FacilityError> {
    store.facilities.get_mut(&id).ok_or(FacilityError::NotFound(id))
}

// =============================================================================
// PROFILE
// =============================================================================

/// Every facility, by name.
pub async fn list(state: &AppState) -> Vec<Facility> {
    let store = state.store.read().await;
    let mut facilities: Vec<Facility> = store.facilities.values().cloned().collect();
    facilities.sort_by(|a, b| a.name.cmp(&b.name));
    facilities
}

/// # Errors
///
/// `NotFound` for an unknown id.
pub async fn get(state: &AppState, id: Uuid) -> Result<Facility, FacilityError> {
    let store = state.store.read().await;
    store.facilities.get(&id).cloned().ok_or(FacilityError::NotFound(id))
}

/// # Errors
///
/// `Forbidden` unless the caller is the facility; `NotFound`.
pub async fn update(state: &AppState, actor: Actor, id: Uuid, patch: FacilityUpdate) -> Result<Facility, FacilityError> {
    require_self(actor, id)?;
    let mut store = state.store.write().await;
    let facility = facility_mut(&mut store, id)?;

    if let Some(v) = patch.name {
        facility.name = v;
    }
    if let Some(v) = patch.address {
        facility.address = v;
    }
    if let Some(v) = patch.contact_phone {
        facility.contact_phone = v;
    }
    if let Some(v) = patch.facility_type {
        facility.facility_type = v;
    }
    if let Some(v) = patch.specialty {
        facility.specialty = v;
    }
    if let Some(v) = patch.allowed_waste_types {
        facility.allowed_waste_types = v;
    }
    if let Some(v) = patch.fee_configs {
        facility.fee_configs = v;
    }
    if let Some(v) = patch.preferred_settlement {
        facility.preferred_settlement = v;
    }
    if patch.description.is_some() {
        facility.description = patch.description;
    }
    info!(facility_id = %id, "facility: profile updated");
    Ok(facility.clone())
}

/// Change capacity status. Entering FULL publishes one alert to drivers
/// and fleets; staying FULL publishes nothing.
///
/// # Errors
///
/// `Forbidden` unless the caller is the facility; `NotFound`.
pub async fn set_operational_status(
    state: &AppState,
    actor: Actor,
    id: Uuid,
    status: FacilityOperationalStatus,
) -> Result<Facility, FacilityError> {
    require_self(actor, id)?;
    let mut store = state.store.write().await;
    let facility = facility_mut(&mut store, id)?;
    let was = facility.operational_status;
    facility.operational_status = status;
    let facility = facility.clone();

    if status == FacilityOperationalStatus::Full && was != FacilityOperationalStatus::Full {
        warn!(facility_id = %id, name = %facility.name, "facility: full, alerting drivers and fleets");
        store.notices.push(Notice {
            id: Uuid::new_v4(),
            title: format!("🚨 消纳场爆仓告警：{}", facility.name),
            content: FULL_ALERT_CONTENT.into(),
            time: now_ms(),
            kind: NoticeKind::Alert,
            target_roles: vec![UserRole::Driver, UserRole::Fleet],
        });
    } else {
        info!(facility_id = %id, ?status, "facility: status changed");
    }
    Ok(facility)
}

/// Publish a discount or capacity call to drivers and fleets.
///
/// # Errors
///
/// `Forbidden` unless the caller is the facility; `NotFound`.
pub async fn publish_promotion(state: &AppState, actor: Actor, id: Uuid, promotion: Promotion) -> Result<Notice, FacilityError> {
    require_self(actor, id)?;
    let mut store = state.store.write().await;
    let name = store.facilities.get(&id).map(|f| f.name.clone()).ok_or(FacilityError::NotFound(id))?;

    let (title, content, kind) = match promotion {
        Promotion::Discount { price, reason } => {
            (format!("📣 限时优惠：{name}"), format!("入场费下调至 ¥{price}/车！{reason}"), NoticeKind::Notice)
        }
        Promotion::Request { reason } => {
            (format!("🚨 运力召集：{name}"), format!("急需空闲运力入场清运再生骨料。{reason}"), NoticeKind::Alert)
        }
    };
    let notice = Notice {
        id: Uuid::new_v4(),
        title,
        content,
        time: now_ms(),
        kind,
        target_roles: vec![UserRole::Driver, UserRole::Fleet],
    };
    store.notices.push(notice.clone());
    info!(facility_id = %id, notice_id = %notice.id, "facility: promotion published");
    Ok(notice)
}

// =============================================================================
// SETTLEMENT & HISTORY
// =============================================================================

fn completed_here(store: &Store, facility_id: Uuid) -> impl Iterator<Item = &Order> {
    store.orders_newest_first().into_iter().filter(move |o| {
        o.status == OrderStatus::Completed && o.disposal.as_ref().is_some_and(|d| d.facility_id == facility_id)
    })
}

/// Gate-fee totals over the facility's completed orders.
///
/// # Errors
///
/// `NotFound` for an unknown facility.
pub async fn settlement_summary(state: &AppState, id: Uuid) -> Result<SettlementSummary, FacilityError> {
    let store = state.store.read().await;
    if !store.facilities.contains_key(&id) {
        return Err(FacilityError::NotFound(id));
    }
    let mut summary = SettlementSummary::default();
    for record in completed_here(&store, id).filter_map(|o| o.disposal.as_ref()) {
        if record.settlement_status == SettlementStatus::PendingPlatform {
            summary.pending_platform += record.fee;
        }
        if record.settlement_method == SettlementMethod::Direct {
            summary.direct += record.fee;
        }
        if record.settlement_status == SettlementStatus::Paid {
            summary.paid += record.fee;
        }
    }
    Ok(summary)
}

/// Completed orders at the facility, newest first. `search` matches the
/// manifest serial, order id, driver plate, or community.
///
/// # Errors
///
/// `NotFound` for an unknown facility.
pub async fn history(
    state: &AppState,
    id: Uuid,
    search: Option<&str>,
    filter: SettlementFilter,
) -> Result<Vec<Order>, FacilityError> {
    let store = state.store.read().await;
    if !store.facilities.contains_key(&id) {
        return Err(FacilityError::NotFound(id));
    }
    let needle = search.map(str::trim).filter(|s| !s.is_empty());
    Ok(completed_here(&store, id)
        .filter(|o| needle.is_none_or(|n| matches_search(o, n)))
        .filter(|o| {
            let status = o.disposal.as_ref().map(|d| d.settlement_status);
            match filter {
                SettlementFilter::All => true,
                SettlementFilter::Pending => status == Some(SettlementStatus::PendingPlatform),
                SettlementFilter::Paid => status == Some(SettlementStatus::Paid),
            }
        })
        .cloned()
        .collect())
}

fn matches_search(order: &Order, needle: &str) -> bool {
    order.id.to_string().contains(needle)
        || order.manifest_serial_no.as_deref().is_some_and(|s| s.contains(needle))
        || order.assigned_driver.as_ref().is_some_and(|d| d.plate.contains(needle))
        || order
            .pickup_details
            .as_ref()
            .is_some_and(|p| p.community.contains(needle))
}

#[cfg(test)]
#[path = "facility_test.rs"]
mod tests;
