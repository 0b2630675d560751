//! Recycled-materials market.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::ApiError;
use crate::model::{Actor, Order, PromotionType, RecycledProduct, RecycledProductType};
use crate::services::market::{self, MarketError, PublishedProduct};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductQuery {
    pub product_type: Option<RecycledProductType>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishBody {
    pub image: String,
    #[serde(default)]
    pub promotion: Option<PromotionType>,
}

pub(crate) fn market_error_to_status(err: &MarketError) -> StatusCode {
    match err {
        MarketError::FacilityNotFound(_) => StatusCode::NOT_FOUND,
        MarketError::MissingField(_) => StatusCode::BAD_REQUEST,
        MarketError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        Self::from_error(market_error_to_status(&err), &err)
    }
}

pub async fn list(State(state): State<AppState>, Query(q): Query<ProductQuery>) -> Json<Vec<RecycledProduct>> {
    Json(market::list_products(&state, q.product_type, q.search.as_deref()).await)
}

pub async fn publish(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<PublishBody>,
) -> Result<(StatusCode, Json<PublishedProduct>), ApiError> {
    let published = market::publish_product(&state, actor, &body.image, body.promotion).await?;
    Ok((StatusCode::CREATED, Json(published)))
}

pub async fn clearance(State(state): State<AppState>) -> Json<Vec<RecycledProduct>> {
    Json(market::clearance(&state).await)
}

pub async fn demand(State(state): State<AppState>) -> Json<Vec<Order>> {
    Json(market::demand(&state).await)
}

#[cfg(test)]
#[path = "market_test.rs"]
mod tests;
