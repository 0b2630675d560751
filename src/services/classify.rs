//! Waste and commodity classification from photos or video.
//!
//! Never fails toward the caller: any model, transport, or decode problem is
//! logged and replaced by a fixed fallback record with `fallback: true`.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::ai::{self, split_data_url};
use super::pricing;
use crate::llm::types::{GenerateRequest, ModelTier};
use crate::model::{
    CollectionMethod, LaborServiceType, MediaType, ProductAnalysis, RecycledProductType, WasteAnalysis, WasteType,
};
use crate::state::AppState;

pub const WASTE_FALLBACK_DESCRIPTION: &str = "Failed to analyze media. Please describe manually.";
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
const DEFAULT_VIDEO_MIME: &str = "video/mp4";
const CLASSIFY_MAX_TOKENS: u32 = 1024;

/// A classification plus whether it is the fallback record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classified<T> {
    pub result: T,
    pub fallback: bool,
}

// =============================================================================
// WASTE
// =============================================================================

/// Classify waste media. `media` is raw base64 or a data URL.
pub async fn analyze_waste(
    state: &AppState,
    actor_id: Uuid,
    media: &str,
    media_type: MediaType,
    mime: Option<&str>,
    note: Option<&str>,
) -> Classified<WasteAnalysis> {
    let (url_mime, payload) = split_data_url(media);
    let mime = mime.or(url_mime).unwrap_or(match media_type {
        MediaType::Image => DEFAULT_IMAGE_MIME,
        MediaType::Video => DEFAULT_VIDEO_MIME,
    });

    let request = GenerateRequest::new(ModelTier::Vision)
        .with_media(mime, payload)
        .with_text(waste_prompt(media_type, note))
        .with_schema(waste_schema());
    let request = GenerateRequest { max_tokens: CLASSIFY_MAX_TOKENS, ..request };

    match ai::generate_json::<WasteReply>(state, actor_id, &request).await {
        Ok(reply) => {
            let analysis = reply.into_analysis();
            info!(%actor_id, waste_type = analysis.waste_type.as_str(), price = analysis.estimated_price, "classify: waste");
            Classified { result: analysis, fallback: false }
        }
        Err(e) => {
            warn!(%actor_id, error = %e, "classify: waste analysis failed, using fallback");
            Classified { result: waste_fallback(), fallback: true }
        }
    }
}

/// Record returned whenever waste classification fails.
#[must_use]
pub fn waste_fallback() -> WasteAnalysis {
    let labor = LaborServiceType::LoadingOnly;
    WasteAnalysis {
        waste_type: WasteType::Unknown,
        estimated_weight_kg: 10.0,
        estimated_volume: "Unknown".into(),
        estimated_price: pricing::quote(WasteType::Unknown, labor).total,
        description: WASTE_FALLBACK_DESCRIPTION.into(),
        recommended_vehicle: "Standard Truck".into(),
        hazard_warning: None,
        is_bagged: false,
        is_collected: true,
        labor_service_recommendation: labor,
        recommended_collection_method: CollectionMethod::Immediate,
    }
}

/// Model reply. The model's own price guess is accepted but discarded.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WasteReply {
    waste_type: WasteType,
    estimated_weight_kg: f64,
    estimated_volume: String,
    #[allow(dead_code)]
    #[serde(default)]
    estimated_price: Option<f64>,
    description: String,
    recommended_vehicle: String,
    #[serde(default)]
    hazard_warning: Option<String>,
    is_bagged: bool,
    is_collected: bool,
    labor_service_recommendation: LaborServiceType,
    recommended_collection_method: CollectionMethod,
}

impl WasteReply {
    fn into_analysis(self) -> WasteAnalysis {
        let price = pricing::quote(self.waste_type, self.labor_service_recommendation).total;
        WasteAnalysis {
            waste_type: self.waste_type,
            estimated_weight_kg: self.estimated_weight_kg,
            estimated_volume: self.estimated_volume,
            estimated_price: price,
            description: self.description,
            recommended_vehicle: self.recommended_vehicle,
            hazard_warning: self.hazard_warning.filter(|w| !w.trim().is_empty()),
            is_bagged: self.is_bagged,
            is_collected: self.is_collected,
            labor_service_recommendation: self.labor_service_recommendation,
            recommended_collection_method: self.recommended_collection_method,
        }
    }
}

fn waste_prompt(media_type: MediaType, note: Option<&str>) -> String {
    let medium = match media_type {
        MediaType::Image => "image",
        MediaType::Video => "video",
    };
    let mut prompt = format!(
        "Analyze this {medium} of waste/trash for a waste removal service.

1. Identify the primary category among these three main types:
   - CONSTRUCTION (Main): Bricks, concrete, tiles, drywall, renovation debris, broken wood, pipes.
   - BULKY (Main): Furniture, mattresses, sofas, large appliances, tables, chairs.
   - GARDEN (Main): Branches, leaves, grass, soil, trees, organic yard waste.
   Use the following only if it strictly matches and is NOT one of the above:
   - HAZARDOUS: Paints, chemicals, batteries.
   - GENERAL: Mixed household waste, small plastic bags.
   - RECYCLABLE: Pure cardboard piles, scrap metal piles.
   - ELECTRONIC: Computers, TVs.
2. Estimate weight (kg) and visual volume (e.g. \"2 bags\", \"0.5m3\").
3. Estimate disposal cost in CNY.
4. Describe the waste.
5. Recommend vehicle (Pickup, Dump Truck, Van).
6. Check condition: is the waste inside bags (isBagged)? Is it gathered in a single pile (isCollected)?
7. Labor: scattered or indoors needing carrying -> CARRY_AND_LOAD; curbside pile needing lifting -> LOADING_ONLY; drive-up -> NONE.
8. Safety warnings if hazardous.
9. Collection method: volume over 2m3, loose renovation waste, or scattered -> CONTAINER; otherwise IMMEDIATE."
    );
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        prompt.push_str("\n\nCustomer note: ");
        prompt.push_str(note);
    }
    prompt
}

fn waste_schema() -> serde_json::Value {
    let waste_types: Vec<&str> = WasteType::ALL.iter().map(|w| w.as_str()).collect();
    let labor: Vec<&str> = LaborServiceType::ALL.iter().map(|l| l.as_str()).collect();
    let methods: Vec<&str> = CollectionMethod::ALL.iter().map(|m| m.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "wasteType": { "type": "string", "enum": waste_types },
            "estimatedWeightKg": { "type": "number" },
            "estimatedVolume": { "type": "string" },
            "estimatedPrice": { "type": "number" },
            "description": { "type": "string" },
            "recommendedVehicle": { "type": "string" },
            "hazardWarning": { "type": "string" },
            "isBagged": { "type": "boolean" },
            "isCollected": { "type": "boolean" },
            "laborServiceRecommendation": { "type": "string", "enum": labor },
            "recommendedCollectionMethod": { "type": "string", "enum": methods }
        },
        "required": [
            "wasteType", "estimatedWeightKg", "estimatedVolume", "estimatedPrice", "description",
            "recommendedVehicle", "isBagged", "isCollected", "laborServiceRecommendation",
            "recommendedCollectionMethod"
        ]
    })
}

// =============================================================================
// COMMODITIES
// =============================================================================

/// Classify a photo of recycled stock. `image` is raw base64 or a data URL.
pub async fn analyze_product(state: &AppState, actor_id: Uuid, image: &str) -> Classified<ProductAnalysis> {
    let (url_mime, payload) = split_data_url(image);
    let mime = url_mime.unwrap_or(DEFAULT_IMAGE_MIME);

    let request = GenerateRequest::new(ModelTier::Vision)
        .with_media(mime, payload)
        .with_text(PRODUCT_PROMPT)
        .with_schema(product_schema());
    let request = GenerateRequest { max_tokens: CLASSIFY_MAX_TOKENS, ..request };

    match ai::generate_json::<ProductReply>(state, actor_id, &request).await {
        Ok(reply) => {
            let analysis = reply.into_analysis();
            info!(%actor_id, product_type = analysis.product_type.as_str(), "classify: product");
            Classified { result: analysis, fallback: false }
        }
        Err(e) => {
            warn!(%actor_id, error = %e, "classify: product analysis failed, using fallback");
            Classified { result: product_fallback(), fallback: true }
        }
    }
}

#[must_use]
pub fn product_fallback() -> ProductAnalysis {
    ProductAnalysis { product_type: RecycledProductType::Other, quantity: "Unknown".into(), estimated_value: 0 }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductReply {
    #[serde(rename = "type")]
    product_type: RecycledProductType,
    quantity: String,
    estimated_value: f64,
}

impl ProductReply {
    #[allow(clippy::cast_possible_truncation)]
    fn into_analysis(self) -> ProductAnalysis {
        let value = if self.estimated_value.is_finite() { self.estimated_value.round().max(0.0) as i64 } else { 0 };
        ProductAnalysis { product_type: self.product_type, quantity: self.quantity, estimated_value: value }
    }
}

const PRODUCT_PROMPT: &str = "Analyze this image of recycled material/commodities at a processing facility.
Identify the material type from the following categories:
- Stone Powder (石粉)
- Gravel/Aggregate (石子/骨料)
- Scrap Iron/Metal (废铁)
- Wood/Timber (木材)
- Plastic (塑料)
- Glass (玻璃)
- Light Material (轻物质)
Estimate the quantity seen in the image (e.g., \"50 tons\", \"500kg\").
Estimate a rough market value or stock value in CNY.";

fn product_schema() -> serde_json::Value {
    let types: Vec<&str> = RecycledProductType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect();
    json!({
        "type": "object",
        "properties": {
            "type": { "type": "string", "enum": types },
            "quantity": { "type": "string" },
            "estimatedValue": { "type": "number" }
        },
        "required": ["type", "quantity", "estimatedValue"]
    })
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
