//! Recycled-commodity marketplace: facility listings and buyer demand.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::classify;
use crate::model::{
    Actor, Order, OrderStatus, OrderType, PromotionType, RecycledProduct, RecycledProductType, TradeDirection,
    UserRole, now_ms,
};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("facility not found: {0}")]
    FacilityNotFound(Uuid),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl crate::error::ErrorCode for MarketError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FacilityNotFound(_) => "E_FACILITY_NOT_FOUND",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::Forbidden(_) => "E_FORBIDDEN",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedProduct {
    pub product: RecycledProduct,
    pub fallback: bool,
}

/// Classify a stock photo and list it under the calling facility.
///
/// The store lock is released during the model call.
///
/// # Errors
///
/// `Forbidden` for non-facility callers, `MissingField` for an empty image,
/// `FacilityNotFound`.
pub async fn publish_product(
    state: &AppState,
    actor: Actor,
    image: &str,
    promotion: Option<PromotionType>,
) -> Result<PublishedProduct, MarketError> {
    if actor.role != UserRole::Disposal {
        return Err(MarketError::Forbidden("only facilities can list products".into()));
    }
    if image.trim().is_empty() {
        return Err(MarketError::MissingField("image"));
    }
    if !state.store.read().await.facilities.contains_key(&actor.id) {
        return Err(MarketError::FacilityNotFound(actor.id));
    }

    let classified = classify::analyze_product(state, actor.id, image).await;

    let mut store = state.store.write().await;
    let facility = store
        .facilities
        .get(&actor.id)
        .ok_or(MarketError::FacilityNotFound(actor.id))?;
    let analysis = classified.result;
    let product = RecycledProduct {
        id: Uuid::new_v4(),
        product_type: analysis.product_type,
        quantity: analysis.quantity,
        estimated_value: analysis.estimated_value,
        image_ref: image.to_string(),
        created_at: now_ms(),
        facility_id: facility.id,
        facility_name: facility.name.clone(),
        facility_location: facility.location.address.clone().unwrap_or_else(|| facility.address.clone()),
        contact_phone: facility.contact_phone.clone(),
        promotion_type: promotion.unwrap_or(PromotionType::None),
        facility_status: Some(facility.operational_status),
        facility_specialty: Some(facility.specialty.clone()),
    };
    store.products.push(product.clone());
    info!(
        product_id = %product.id,
        facility_id = %actor.id,
        product_type = product.product_type.as_str(),
        fallback = classified.fallback,
        "market: product listed"
    );
    Ok(PublishedProduct { product, fallback: classified.fallback })
}

/// Listings newest first. `search` is case-insensitive over the quantity,
/// facility name, and type display name.
pub async fn list_products(
    state: &AppState,
    product_type: Option<RecycledProductType>,
    search: Option<&str>,
) -> Vec<RecycledProduct> {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let store = state.store.read().await;
    let mut products: Vec<RecycledProduct> = store
        .products
        .iter()
        .filter(|p| product_type.is_none_or(|t| p.product_type == t))
        .filter(|p| needle.as_deref().is_none_or(|n| product_matches(p, n)))
        .cloned()
        .collect();
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    products
}

fn product_matches(product: &RecycledProduct, needle: &str) -> bool {
    product.quantity.to_lowercase().contains(needle)
        || product.facility_name.to_lowercase().contains(needle)
        || product.product_type.display_name().contains(needle)
}

/// Listings on discount or free to take.
pub async fn clearance(state: &AppState) -> Vec<RecycledProduct> {
    let mut products = list_products(state, None, None).await;
    products.retain(|p| matches!(p.promotion_type, PromotionType::Discount | PromotionType::Free));
    products
}

/// Open buy requests from enterprises, newest first.
pub async fn demand(state: &AppState) -> Vec<Order> {
    let store = state.store.read().await;
    store
        .orders_newest_first()
        .into_iter()
        .filter(|o| {
            o.order_type == OrderType::RecycleTrade
                && o.trade_direction == Some(TradeDirection::Buy)
                && o.status != OrderStatus::Completed
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "market_test.rs"]
mod tests;
