use super::*;
use std::sync::Arc;

use crate::model::{BuyRequirements, FacilityOperationalStatus};
use crate::state::test_helpers::{self, MockLlm};

const IRON_REPLY: &str = r#"{"type":"SCRAP_IRON","quantity":"3 Tons","estimatedValue":4500}"#;

async fn listed(state: &AppState, facility: Uuid, promotion: Option<PromotionType>) -> RecycledProduct {
    publish_product(state, Actor::new(UserRole::Disposal, facility), "data:image/png;base64,AAAA", promotion)
        .await
        .unwrap()
        .product
}

#[tokio::test]
async fn publish_copies_facility_profile() {
    let mock = Arc::new(MockLlm::replying(IRON_REPLY));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let facility = test_helpers::seed_facility(&state).await;

    let out = publish_product(&state, Actor::new(UserRole::Disposal, facility), "data:image/png;base64,AAAA", None)
        .await
        .unwrap();
    assert!(!out.fallback);
    let product = out.product;
    assert_eq!(product.product_type, RecycledProductType::ScrapIron);
    assert_eq!(product.estimated_value, 4500);
    assert_eq!(product.facility_name, "测试消纳场");
    assert_eq!(product.facility_location, "浦东新区测试路 1 号");
    assert_eq!(product.contact_phone, "021-00000000");
    assert_eq!(product.facility_status, Some(FacilityOperationalStatus::Open));
    assert_eq!(product.facility_specialty.as_deref(), Some("建筑垃圾"));
    assert_eq!(product.promotion_type, PromotionType::None);
    assert_eq!(state.store.read().await.products.len(), 1);
}

#[tokio::test]
async fn publish_without_model_lists_fallback() {
    let state = test_helpers::test_app_state();
    let facility = test_helpers::seed_facility(&state).await;
    let out = publish_product(&state, Actor::new(UserRole::Disposal, facility), "AAAA", Some(PromotionType::Free))
        .await
        .unwrap();
    assert!(out.fallback);
    assert_eq!(out.product.product_type, RecycledProductType::Other);
    assert_eq!(out.product.promotion_type, PromotionType::Free);
}

#[tokio::test]
async fn only_facilities_publish() {
    let mock = Arc::new(MockLlm::replying(IRON_REPLY));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let err = publish_product(&state, Actor::new(UserRole::Client, Uuid::new_v4()), "AAAA", None)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)));

    let err = publish_product(&state, Actor::new(UserRole::Disposal, Uuid::new_v4()), "AAAA", None)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::FacilityNotFound(_)));
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn search_is_case_insensitive_and_covers_type_name() {
    let mock = Arc::new(MockLlm::replying(IRON_REPLY));
    let state = test_helpers::test_app_state_with_llm(mock.clone());
    let facility = test_helpers::seed_facility(&state).await;
    listed(&state, facility, None).await;

    assert_eq!(list_products(&state, None, Some("tons")).await.len(), 1);
    assert_eq!(list_products(&state, None, Some("废铁")).await.len(), 1);
    assert_eq!(list_products(&state, None, Some("测试消纳")).await.len(), 1);
    assert!(list_products(&state, None, Some("玻璃")).await.is_empty());
    assert!(list_products(&state, Some(RecycledProductType::Wood), None).await.is_empty());
    assert_eq!(list_products(&state, Some(RecycledProductType::ScrapIron), Some("  ")).await.len(), 1);
}

#[tokio::test]
async fn clearance_holds_discount_and_free_only() {
    let state = test_helpers::test_app_state();
    let facility = test_helpers::seed_facility(&state).await;
    listed(&state, facility, None).await;
    listed(&state, facility, Some(PromotionType::Discount)).await;
    listed(&state, facility, Some(PromotionType::Free)).await;

    let out = clearance(&state).await;
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|p| p.promotion_type != PromotionType::None));
}

#[tokio::test]
async fn demand_lists_open_buy_orders() {
    let state = test_helpers::test_app_state();
    let buyer = Actor::new(UserRole::Enterprise, Uuid::new_v4());
    let open = test_helpers::seed_order(&state, buyer, OrderType::RecycleTrade, OrderStatus::PendingPickup).await;
    let done = test_helpers::seed_order(&state, buyer, OrderType::RecycleTrade, OrderStatus::Completed).await;
    test_helpers::seed_order(&state, buyer, OrderType::WasteRemoval, OrderStatus::PendingPickup).await;
    {
        let mut store = state.store.write().await;
        for id in [open, done] {
            let order = store.orders.get_mut(&id).unwrap();
            order.trade_direction = Some(TradeDirection::Buy);
            order.buy_requirements = Some(BuyRequirements {
                product_type: RecycledProductType::Gravel,
                quantity: "50 吨".into(),
                target_price: 35.0,
            });
        }
    }

    let out = demand(&state).await;
    assert_eq!(out.iter().map(|o| o.id).collect::<Vec<_>>(), vec![open]);
}
