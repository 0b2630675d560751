//! Price quotes. Public; no caller identity needed.

use axum::Json;
use axum::extract::Query;
use serde::Deserialize;

use crate::model::{CollectionMethod, LaborServiceType, WasteType};
use crate::services::pricing::{self, EnterpriseQuote, EnterpriseServices, Quote};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQuery {
    pub waste_type: WasteType,
    #[serde(default = "no_labor")]
    pub labor: LaborServiceType,
}

fn no_labor() -> LaborServiceType {
    LaborServiceType::None
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseQuoteBody {
    #[serde(default)]
    pub contract_price_per_truck: Option<i64>,
    pub method: CollectionMethod,
    #[serde(default)]
    pub services: EnterpriseServices,
    pub trucks: u32,
}

pub async fn quote(Query(q): Query<QuoteQuery>) -> Json<Quote> {
    Json(pricing::quote(q.waste_type, q.labor))
}

pub async fn enterprise_quote(Json(body): Json<EnterpriseQuoteBody>) -> Json<EnterpriseQuote> {
    Json(pricing::enterprise_quote(
        body.contract_price_per_truck,
        body.method,
        body.services,
        body.trucks,
    ))
}
