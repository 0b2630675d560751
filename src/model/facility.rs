//! Disposal and recycling sites.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GeoLocation, SettlementMethod, VerificationStatus, WasteType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityOperationalStatus {
    Open,
    Busy,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityType {
    FixedDisposal,
    TempTransfer,
    MobileDisposal,
    DropOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeUnit {
    Truck,
    Ton,
    Cubic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfig {
    pub waste_type: WasteType,
    pub price_per_unit: i64,
    pub unit: FeeUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: GeoLocation,
    pub contact_phone: String,
    pub status: VerificationStatus,
    pub joined_at: i64,
    pub operational_status: FacilityOperationalStatus,
    pub facility_type: FacilityType,
    pub specialty: String,
    pub allowed_waste_types: Vec<WasteType>,
    pub fee_configs: Vec<FeeConfig>,
    pub preferred_settlement: SettlementMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Facility {
    /// Whether the site takes this category. Unclassified loads are always admitted.
    #[must_use]
    pub fn accepts(&self, waste_type: WasteType) -> bool {
        waste_type == WasteType::Unknown || self.allowed_waste_types.contains(&waste_type)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.operational_status == FacilityOperationalStatus::Full
    }
}
