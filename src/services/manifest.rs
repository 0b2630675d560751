//! Disposal manifests: serial allocation, issue, and digest verification.
//!
//! The digest is SHA-256 over the manifest's canonical JSON with the
//! `digest` key removed. `serde_json::Map` keeps keys sorted, so the same
//! field values always hash the same way.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::model::{
    Driver, Facility, Manifest, ManifestKind, Order, SettlementMethod, SettlementStatus, WasteType, now_ms,
};
use crate::state::Store;

/// Serial for a manifest issued at `issued_at`: `MF-` plus the last six
/// digits of the timestamp, suffixed `-2`, `-3`, … on collision.
#[must_use]
pub fn allocate_serial(store: &Store, issued_at: i64) -> String {
    let base = format!("MF-{:06}", issued_at.rem_euclid(1_000_000));
    if !store.manifests.contains_key(&base) {
        return base;
    }
    (2u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !store.manifests.contains_key(candidate))
        .unwrap_or(base)
}

/// What the facility settled when it admitted the load.
#[derive(Debug, Clone, Copy)]
pub struct Settlement {
    pub waste_type: WasteType,
    pub fee: i64,
    pub method: SettlementMethod,
    pub status: SettlementStatus,
}

/// Build, seal, and store a manifest for `order`. The caller sets the
/// order's serial and status.
pub fn issue(store: &mut Store, order: &Order, facility: &Facility, settlement: Settlement) -> Manifest {
    let issued_at = now_ms();
    let serial_no = allocate_serial(store, issued_at);
    let assigned = order.assigned_driver.clone().unwrap_or_default();
    let driver = assigned.driver_id.and_then(|id| store.drivers.get(&id));

    let mut manifest = Manifest {
        serial_no: serial_no.clone(),
        order_id: order.id,
        driver_name: assigned.name,
        driver_plate: assigned.plate,
        fleet_name: assigned.fleet_name,
        facility_id: facility.id,
        facility_name: facility.name.clone(),
        waste_type: settlement.waste_type,
        fee: settlement.fee,
        settlement_method: settlement.method,
        settlement_status: settlement.status,
        issued_at,
        kind: kind_for(driver),
        digest: String::new(),
    };
    manifest.digest = compute_digest(&manifest);

    store.manifests.insert(serial_no, manifest.clone());
    manifest
}

/// Independent drivers only get a technical manifest; fleet drivers get the
/// official one.
fn kind_for(driver: Option<&Driver>) -> ManifestKind {
    match driver {
        Some(d) if d.is_independent || d.fleet_id.is_none() => ManifestKind::Technical,
        _ => ManifestKind::Official,
    }
}

/// Hex SHA-256 over every field except `digest`.
#[must_use]
pub fn compute_digest(manifest: &Manifest) -> String {
    let mut value = serde_json::to_value(manifest).unwrap_or_default();
    if let Some(map) = value.as_object_mut() {
        map.remove("digest");
    }
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[must_use]
pub fn verify(manifest: &Manifest) -> bool {
    compute_digest(manifest) == manifest.digest
}

/// Manifest for an order, if one was issued.
#[must_use]
pub fn for_order(store: &Store, order_id: Uuid) -> Option<&Manifest> {
    store
        .orders
        .get(&order_id)
        .and_then(|o| o.manifest_serial_no.as_ref())
        .and_then(|serial| store.manifests.get(serial))
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
