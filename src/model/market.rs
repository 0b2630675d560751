//! Recycled commodities offered on the marketplace.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FacilityOperationalStatus;

/// Commodity category produced by product classification. Exactly eight values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecycledProductType {
    StonePowder,
    Gravel,
    LightMaterial,
    ScrapIron,
    Wood,
    Plastic,
    Glass,
    Other,
}

impl RecycledProductType {
    pub const ALL: [Self; 8] = [
        Self::StonePowder,
        Self::Gravel,
        Self::LightMaterial,
        Self::ScrapIron,
        Self::Wood,
        Self::Plastic,
        Self::Glass,
        Self::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StonePowder => "STONE_POWDER",
            Self::Gravel => "GRAVEL",
            Self::LightMaterial => "LIGHT_MATERIAL",
            Self::ScrapIron => "SCRAP_IRON",
            Self::Wood => "WOOD",
            Self::Plastic => "PLASTIC",
            Self::Glass => "GLASS",
            Self::Other => "OTHER",
        }
    }

    /// Display name used by marketplace search.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::StonePowder => "石粉",
            Self::Gravel => "石子/骨料",
            Self::LightMaterial => "轻物质",
            Self::ScrapIron => "废铁",
            Self::Wood => "木材",
            Self::Plastic => "塑料",
            Self::Glass => "玻璃",
            Self::Other => "其他",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionType {
    None,
    Discount,
    Free,
}

/// Structured result of commodity classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalysis {
    #[serde(rename = "type")]
    pub product_type: RecycledProductType,
    pub quantity: String,
    pub estimated_value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycledProduct {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub product_type: RecycledProductType,
    pub quantity: String,
    pub estimated_value: i64,
    pub image_ref: String,
    pub created_at: i64,
    pub facility_id: Uuid,
    pub facility_name: String,
    pub facility_location: String,
    pub contact_phone: String,
    pub promotion_type: PromotionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_status: Option<FacilityOperationalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_specialty: Option<String>,
}
