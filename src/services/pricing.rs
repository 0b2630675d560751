//! Price composition in whole CNY.
//!
//! All arithmetic is integer; the tax multiplier is applied as `× 106 / 100`
//! with half-up rounding.

use serde::{Deserialize, Serialize};

use crate::model::{CollectionMethod, Facility, FeeUnit, LaborServiceType, WasteType};

/// Default disposal fee per truck when a facility has no matching config.
pub const DEFAULT_DISPOSAL_FEE: i64 = 450;

pub const ENTERPRISE_DEFAULT_BASE: i64 = 500;
pub const ENTERPRISE_CONTAINER_FEE: i64 = 300;
pub const ENTERPRISE_LABOR_FEE: i64 = 150;
pub const ENTERPRISE_LOADING_FEE: i64 = 100;

/// Removal base rate per truck.
#[must_use]
pub fn base_rate(waste_type: WasteType) -> i64 {
    match waste_type {
        WasteType::Construction | WasteType::Unknown => 1200,
        WasteType::Hazardous => 2500,
        WasteType::Electronic => 1500,
        WasteType::General | WasteType::Garden => 800,
        WasteType::Organic => 900,
        WasteType::Recyclable => 600,
        WasteType::Bulky => 1000,
    }
}

#[must_use]
pub fn labor_rate(labor: LaborServiceType) -> i64 {
    match labor {
        LaborServiceType::None => 0,
        LaborServiceType::LoadingOnly => 100,
        LaborServiceType::CarryAndLoad => 300,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub base: i64,
    pub labor: i64,
    pub total: i64,
}

#[must_use]
pub fn quote(waste_type: WasteType, labor: LaborServiceType) -> Quote {
    let base = base_rate(waste_type);
    let labor = labor_rate(labor);
    Quote { base, labor, total: base + labor }
}

// =============================================================================
// ENTERPRISE
// =============================================================================

/// Optional add-ons chosen on a bulk removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnterpriseServices {
    pub labor: bool,
    pub loading: bool,
    pub tax: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseQuote {
    pub subtotal_per_truck: i64,
    pub price_per_truck: i64,
    pub trucks: u32,
    pub total: i64,
}

#[must_use]
pub fn enterprise_quote(
    contract_price_per_truck: Option<i64>,
    method: CollectionMethod,
    services: EnterpriseServices,
    trucks: u32,
) -> EnterpriseQuote {
    let base = contract_price_per_truck
        .filter(|p| *p > 0)
        .unwrap_or(ENTERPRISE_DEFAULT_BASE);
    let container = if method == CollectionMethod::Container { ENTERPRISE_CONTAINER_FEE } else { 0 };
    let labor = if services.labor { ENTERPRISE_LABOR_FEE } else { 0 };
    let loading = if services.loading { ENTERPRISE_LOADING_FEE } else { 0 };

    let subtotal = base + container + labor + loading;
    let per_truck = if services.tax { (subtotal * 106 + 50).div_euclid(100) } else { subtotal };

    EnterpriseQuote {
        subtotal_per_truck: subtotal,
        price_per_truck: per_truck,
        trucks,
        total: per_truck * i64::from(trucks),
    }
}

// =============================================================================
// DISPOSAL
// =============================================================================

/// Per-truck gate fee a facility charges for this waste type.
#[must_use]
pub fn disposal_fee(facility: &Facility, waste_type: WasteType) -> i64 {
    facility
        .fee_configs
        .iter()
        .find(|c| c.waste_type == waste_type && c.unit == FeeUnit::Truck)
        .map_or(DEFAULT_DISPOSAL_FEE, |c| c.price_per_unit)
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
