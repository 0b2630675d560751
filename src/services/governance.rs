//! Municipal oversight: notices, public complaints, and city-wide stats.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::model::{
    Actor, Complaint, ComplaintKind, ComplaintStatus, FacilityOperationalStatus, GeoLocation, Notice, NoticeKind,
    OrderStatus, UserRole, now_ms,
};
use crate::state::AppState;

/// Cubic metres credited per completed truckload.
pub const VOLUME_PER_TRUCK_M3: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum GovernanceError {
    #[error("complaint not found: {0}")]
    ComplaintNotFound(Uuid),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl crate::error::ErrorCode for GovernanceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ComplaintNotFound(_) => "E_COMPLAINT_NOT_FOUND",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::Forbidden(_) => "E_FORBIDDEN",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotice {
    pub title: String,
    pub content: String,
    #[serde(default = "default_notice_kind")]
    pub kind: NoticeKind,
    /// Empty broadcasts to every role.
    #[serde(default)]
    pub target_roles: Vec<UserRole>,
}

fn default_notice_kind() -> NoticeKind {
    NoticeKind::Notice
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    pub kind: ComplaintKind,
    pub location: GeoLocation,
    pub description: String,
    #[serde(default)]
    pub media: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStats {
    pub completed_count: usize,
    pub total_volume_m3: u64,
    pub pending_complaints: usize,
    pub full_facilities: usize,
}

fn require_government(actor: Actor) -> Result<(), GovernanceError> {
    if actor.role == UserRole::Government {
        Ok(())
    } else {
        Err(GovernanceError::Forbidden("government only".into()))
    }
}

// =============================================================================
// NOTICES
// =============================================================================

/// # Errors
///
/// `Forbidden` for non-government callers, `MissingField` for a blank
/// title or content.
pub async fn publish(state: &AppState, actor: Actor, input: NewNotice) -> Result<Notice, GovernanceError> {
    require_government(actor)?;
    let title = input.title.trim();
    let content = input.content.trim();
    if title.is_empty() {
        return Err(GovernanceError::MissingField("title"));
    }
    if content.is_empty() {
        return Err(GovernanceError::MissingField("content"));
    }
    let notice = Notice {
        id: Uuid::new_v4(),
        title: title.to_string(),
        content: content.to_string(),
        time: now_ms(),
        kind: input.kind,
        target_roles: input.target_roles,
    };
    state.store.write().await.notices.push(notice.clone());
    info!(notice_id = %notice.id, kind = ?notice.kind, targets = notice.target_roles.len(), "governance: notice published");
    Ok(notice)
}

/// Notices addressed to `role`, newest first.
pub async fn notices_for(state: &AppState, role: UserRole) -> Vec<Notice> {
    let store = state.store.read().await;
    let mut notices: Vec<Notice> = store.notices.iter().filter(|n| n.visible_to(role)).cloned().collect();
    notices.sort_by(|a, b| b.time.cmp(&a.time));
    notices
}

// =============================================================================
// COMPLAINTS
// =============================================================================

/// # Errors
///
/// `MissingField` for a blank description.
pub async fn file(state: &AppState, actor: Actor, input: NewComplaint) -> Result<Complaint, GovernanceError> {
    if input.description.trim().is_empty() {
        return Err(GovernanceError::MissingField("description"));
    }
    let complaint = Complaint {
        id: Uuid::new_v4(),
        reporter_id: actor.id,
        kind: input.kind,
        location: input.location,
        description: input.description.trim().to_string(),
        media_ref: input.media,
        status: ComplaintStatus::Pending,
        created_at: now_ms(),
    };
    state.store.write().await.complaints.push(complaint.clone());
    info!(complaint_id = %complaint.id, kind = ?complaint.kind, "governance: complaint filed");
    Ok(complaint)
}

/// Government sees every complaint; anyone else only their own.
pub async fn complaints(state: &AppState, actor: Actor) -> Vec<Complaint> {
    let store = state.store.read().await;
    let mut out: Vec<Complaint> = store
        .complaints
        .iter()
        .filter(|c| actor.role == UserRole::Government || c.reporter_id == actor.id)
        .cloned()
        .collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

/// Close a complaint after a rectification order has gone out.
///
/// # Errors
///
/// `Forbidden`, `ComplaintNotFound`.
pub async fn resolve(state: &AppState, actor: Actor, id: Uuid) -> Result<Complaint, GovernanceError> {
    require_government(actor)?;
    let mut store = state.store.write().await;
    let complaint = store
        .complaints
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(GovernanceError::ComplaintNotFound(id))?;
    complaint.status = ComplaintStatus::Resolved;
    info!(complaint_id = %id, "governance: complaint resolved");
    Ok(complaint.clone())
}

// =============================================================================
// STATS
// =============================================================================

pub async fn stats(state: &AppState) -> CityStats {
    let store = state.store.read().await;
    let completed_count = store.orders.values().filter(|o| o.status == OrderStatus::Completed).count();
    CityStats {
        completed_count,
        total_volume_m3: completed_count as u64 * VOLUME_PER_TRUCK_M3,
        pending_complaints: store
            .complaints
            .iter()
            .filter(|c| c.status == ComplaintStatus::Pending)
            .count(),
        full_facilities: store
            .facilities
            .values()
            .filter(|f| f.operational_status == FacilityOperationalStatus::Full)
            .count(),
    }
}

#[cfg(test)]
#[path = "governance_test.rs"]
mod tests;
