use super::*;
use crate::model::{Actor, OrderStatus, OrderType, UserRole};

#[test]
fn store_new_is_empty() {
    let store = Store::new();
    assert!(store.orders.is_empty());
    assert!(store.facilities.is_empty());
    assert!(store.manifests.is_empty());
    assert!(store.copilot_history.is_empty());
}

#[tokio::test]
async fn app_state_without_llm() {
    let state = test_helpers::test_app_state();
    assert!(state.llm.is_none());
    assert!(!state.config.seed);
}

#[tokio::test]
async fn clones_share_one_store() {
    let state = test_helpers::test_app_state();
    let other = state.clone();
    let client = Actor::new(UserRole::Client, Uuid::new_v4());
    let id = test_helpers::seed_order(&state, client, OrderType::WasteRemoval, OrderStatus::PendingPickup).await;
    assert!(other.store.read().await.orders.contains_key(&id));
}

#[tokio::test]
async fn orders_newest_first_sorts_by_created_at() {
    let state = test_helpers::test_app_state();
    let client = Actor::new(UserRole::Client, Uuid::new_v4());
    let older = test_helpers::seed_order(&state, client, OrderType::WasteRemoval, OrderStatus::PendingPickup).await;
    let newer = test_helpers::seed_order(&state, client, OrderType::WasteRemoval, OrderStatus::PendingPickup).await;
    {
        let mut store = state.store.write().await;
        store.orders.get_mut(&older).unwrap().created_at = 1_000;
        store.orders.get_mut(&newer).unwrap().created_at = 2_000;
    }
    let store = state.store.read().await;
    let ids: Vec<Uuid> = store.orders_newest_first().iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![newer, older]);
}
