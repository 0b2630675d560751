//! Order records and the enums that classify them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GeoLocation, RecycledProductType, UserRole};

// =============================================================================
// CLASSIFICATION ENUMS
// =============================================================================

/// Waste category produced by classification. Exactly nine values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WasteType {
    General,
    Construction,
    Hazardous,
    Recyclable,
    Organic,
    Electronic,
    Bulky,
    Garden,
    Unknown,
}

impl WasteType {
    pub const ALL: [Self; 9] = [
        Self::General,
        Self::Construction,
        Self::Hazardous,
        Self::Recyclable,
        Self::Organic,
        Self::Electronic,
        Self::Bulky,
        Self::Garden,
        Self::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Construction => "CONSTRUCTION",
            Self::Hazardous => "HAZARDOUS",
            Self::Recyclable => "RECYCLABLE",
            Self::Organic => "ORGANIC",
            Self::Electronic => "ELECTRONIC",
            Self::Bulky => "BULKY",
            Self::Garden => "GARDEN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaborServiceType {
    None,
    LoadingOnly,
    CarryAndLoad,
}

impl LaborServiceType {
    pub const ALL: [Self; 3] = [Self::None, Self::LoadingOnly, Self::CarryAndLoad];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::LoadingOnly => "LOADING_ONLY",
            Self::CarryAndLoad => "CARRY_AND_LOAD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionMethod {
    Immediate,
    Container,
}

impl CollectionMethod {
    pub const ALL: [Self; 2] = [Self::Immediate, Self::Container];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "IMMEDIATE",
            Self::Container => "CONTAINER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") { Self::Video } else { Self::Image }
    }
}

// =============================================================================
// LIFECYCLE ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Analyzing,
    ReviewRequired,
    PendingPickup,
    InProgress,
    ArrivedPickup,
    LoadingComplete,
    ArrivedDisposal,
    Completed,
}

impl OrderStatus {
    pub const ALL: [Self; 9] = [
        Self::Created,
        Self::Analyzing,
        Self::ReviewRequired,
        Self::PendingPickup,
        Self::InProgress,
        Self::ArrivedPickup,
        Self::LoadingComplete,
        Self::ArrivedDisposal,
        Self::Completed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Analyzing => "ANALYZING",
            Self::ReviewRequired => "REVIEW_REQUIRED",
            Self::PendingPickup => "PENDING_PICKUP",
            Self::InProgress => "IN_PROGRESS",
            Self::ArrivedPickup => "ARRIVED_PICKUP",
            Self::LoadingComplete => "LOADING_COMPLETE",
            Self::ArrivedDisposal => "ARRIVED_DISPOSAL",
            Self::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    WasteRemoval,
    RecycleTrade,
    Demolition,
    Labor,
}

impl OrderType {
    /// Crew jobs handled by workers instead of drivers.
    #[must_use]
    pub fn is_crew_job(self) -> bool {
        matches!(self, Self::Demolition | Self::Labor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementMethod {
    Platform,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Unpaid,
    Paid,
    PendingPlatform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Credit,
    MonthlyBill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeDirection {
    Buy,
    Sell,
}

// =============================================================================
// RECORDS
// =============================================================================

/// Structured result of waste classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteAnalysis {
    pub waste_type: WasteType,
    pub estimated_weight_kg: f64,
    pub estimated_volume: String,
    pub estimated_price: i64,
    pub description: String,
    pub recommended_vehicle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_warning: Option<String>,
    pub is_bagged: bool,
    pub is_collected: bool,
    pub labor_service_recommendation: LaborServiceType,
    pub recommended_collection_method: CollectionMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupDetails {
    pub city: String,
    pub district: String,
    pub street: String,
    pub community: String,
    pub is_collected: bool,
    pub location_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

/// Driver (or fleet placeholder) carrying an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedDriver {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,
    pub name: String,
    pub phone: String,
    pub plate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleet_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedWorker {
    pub worker_id: Uuid,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
}

/// Facility that took on a recycle trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSupplier {
    pub facility_id: Uuid,
    pub facility_name: String,
}

/// Settlement outcome recorded when a facility admits the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposalRecord {
    pub facility_id: Uuid,
    pub facility_name: String,
    pub fee: i64,
    pub settlement_method: SettlementMethod,
    pub settlement_status: SettlementStatus,
    pub entry_photo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequirements {
    pub product_type: RecycledProductType,
    pub quantity: String,
    pub target_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub role: UserRole,
    pub at: i64,
}

/// Who placed the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub role: UserRole,
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer: CustomerRef,
    pub created_at: i64,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub location: GeoLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_details: Option<PickupDetails>,
    pub media_type: MediaType,
    /// Media as uploaded (data URL) or a hosted URL for seeded orders.
    pub media_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<WasteAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver: Option<AssignedDriver>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_worker: Option<AssignedWorker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposal: Option<DisposalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_supplier: Option<TradeSupplier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_direction: Option<TradeDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_requirements: Option<BuyRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_serial_no: Option<String>,
    #[serde(default)]
    pub history: Vec<StatusChange>,
}

impl Order {
    /// A fresh order with no assignments, analysis, or history.
    #[must_use]
    pub fn new(
        customer: CustomerRef,
        order_type: OrderType,
        status: OrderStatus,
        location: GeoLocation,
        media_type: MediaType,
        media_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer,
            created_at: super::now_ms(),
            status,
            order_type,
            location,
            pickup_details: None,
            media_type,
            media_ref: media_ref.into(),
            analysis: None,
            assigned_driver: None,
            assigned_worker: None,
            disposal: None,
            trade_supplier: None,
            loading_photo: None,
            payment_status: None,
            trade_direction: None,
            buy_requirements: None,
            manifest_serial_no: None,
            history: Vec::new(),
        }
    }

    /// Price shown on ledgers; zero until analysed.
    #[must_use]
    pub fn estimated_price(&self) -> i64 {
        self.analysis.as_ref().map_or(0, |a| a.estimated_price)
    }

    #[must_use]
    pub fn fleet_id(&self) -> Option<Uuid> {
        self.assigned_driver.as_ref().and_then(|d| d.fleet_id)
    }

    #[must_use]
    pub fn has_driver(&self) -> bool {
        self.assigned_driver
            .as_ref()
            .is_some_and(|d| d.driver_id.is_some())
    }

    /// Serial shown on the certificate, even before a manifest exists.
    #[must_use]
    pub fn display_serial(&self) -> String {
        if let Some(serial) = &self.manifest_serial_no {
            return serial.clone();
        }
        let simple = self.id.simple().to_string();
        let tail = &simple[simple.len() - 8..];
        format!("CERT-{}", tail.to_uppercase())
    }
}

// =============================================================================
// MANIFEST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManifestKind {
    /// Printed for fleet drivers with an authorised fleet.
    Official,
    /// Issued to independent drivers.
    Technical,
}

/// Disposal certificate. `digest` covers every other field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub serial_no: String,
    pub order_id: Uuid,
    pub driver_name: String,
    pub driver_plate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleet_name: Option<String>,
    pub facility_id: Uuid,
    pub facility_name: String,
    pub waste_type: WasteType,
    pub fee: i64,
    pub settlement_method: SettlementMethod,
    pub settlement_status: SettlementStatus,
    pub issued_at: i64,
    pub kind: ManifestKind,
    pub digest: String,
}
