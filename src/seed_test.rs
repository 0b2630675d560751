use super::*;
use crate::config::AppConfig;
use crate::model::Actor;
use crate::services::{manifest, order};
use crate::state::AppState;

#[test]
fn suppliers_are_real_fleets() {
    let store = demo_store();
    let property = &store.properties[&ids::PROPERTY];
    for supplier in &property.suppliers {
        let fleet = &store.fleets[&supplier.id];
        assert_eq!(fleet.name, supplier.name);
    }
}

#[test]
fn fleet_drivers_point_back_at_fleet() {
    let store = demo_store();
    for fleet in store.fleets.values() {
        for id in &fleet.drivers {
            assert_eq!(store.drivers[id].fleet_id, Some(fleet.id));
        }
    }
}

#[tokio::test]
async fn seeded_order_completes_at_pudong() {
    let state = AppState::with_store(AppConfig { seed: false, ..AppConfig::default() }, None, demo_store());
    let id = state.store.read().await.orders.keys().copied().next().unwrap();
    let facility = Actor::new(UserRole::Disposal, ids::FACILITY_PUDONG);

    let done = order::confirm_disposal_entry(&state, facility, id, "gate.jpg").await.unwrap();
    assert_eq!(done.order.status, OrderStatus::Completed);
    assert_eq!(done.manifest.fee, 450);
    assert!(manifest::verify(&done.manifest));
}
