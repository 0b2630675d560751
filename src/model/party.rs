//! Accounts for every non-customer participant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GeoLocation, ProjectStatus, VerificationStatus};

// =============================================================================
// DRIVERS & FLEETS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub license_number: String,
    pub vehicle_plate: String,
    pub vehicle_type: String,
    pub status: VerificationStatus,
    pub joined_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleet_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleet_name: Option<String>,
    pub is_independent: bool,
}

/// Site a fleet hauls from. Driver self-orders start at one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetProject {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub status: ProjectStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fleet {
    pub id: Uuid,
    pub name: String,
    pub manager_name: String,
    pub total_vehicles: u32,
    pub safety_score: u32,
    pub is_authorized_print: bool,
    pub status: VerificationStatus,
    pub projects: Vec<FleetProject>,
    pub drivers: Vec<Uuid>,
}

// =============================================================================
// WORKERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerAvailability {
    Available,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub skills: Vec<String>,
    pub rating: f64,
    pub availability: WorkerAvailability,
    pub status: VerificationStatus,
}

// =============================================================================
// ENTERPRISE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    Pending,
    Synced,
    Failed,
}

/// Registration mirrored to the municipal construction-waste platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSync {
    pub platform_name: String,
    pub external_id: String,
    pub sync_status: SyncStatus,
    pub last_sync_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseProject {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: GeoLocation,
    pub status: ProjectStatus,
    pub created_at: i64,
    pub has_construction_permit: bool,
    pub has_discharge_permit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_sync: Option<ExternalSync>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseAccount {
    pub id: Uuid,
    pub company_name: String,
    pub contact_phone: String,
    pub credit_limit: i64,
    pub used_credit: i64,
    pub billing_cycle: String,
    pub projects: Vec<EnterpriseProject>,
    pub status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_price_per_truck: Option<i64>,
}

impl EnterpriseAccount {
    #[must_use]
    pub fn available_credit(&self) -> i64 {
        self.credit_limit - self.used_credit
    }
}

// =============================================================================
// PROPERTY & GOVERNMENT
// =============================================================================

/// Haulage contractor retained by a property manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySupplier {
    pub id: Uuid,
    pub name: String,
    pub manager: String,
    pub phone: String,
    pub truck_count: u32,
    pub rating: f64,
    pub active: bool,
    pub contract_until: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAccount {
    pub id: Uuid,
    pub name: String,
    pub contact_phone: String,
    pub managed_communities: Vec<String>,
    pub status: VerificationStatus,
    pub suppliers: Vec<PropertySupplier>,
}

impl PropertyAccount {
    #[must_use]
    pub fn manages(&self, community: &str) -> bool {
        self.managed_communities.iter().any(|c| c == community)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernmentAccount {
    pub id: Uuid,
    pub region_name: String,
    pub department: String,
    pub status: VerificationStatus,
}
