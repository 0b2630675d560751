use super::*;
use crate::state::test_helpers;

fn removal(project_id: Uuid, trucks: u32) -> BulkRemoval {
    BulkRemoval {
        project_id,
        trucks,
        waste_type: WasteType::Construction,
        method: CollectionMethod::Immediate,
        services: EnterpriseServices { labor: true, ..EnterpriseServices::default() },
        assign_fleet: None,
    }
}

#[tokio::test]
async fn account_view_derives_credit_figures() {
    let state = test_helpers::test_app_state();
    let (id, _) = test_helpers::seed_enterprise(&state, 10_000, 2_500).await;
    let view = account(&state, id).await.unwrap();
    assert_eq!(view.available_credit, 7_500);
    assert!((view.usage_percent - 25.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn new_project_is_pending_with_sync_record() {
    let state = test_helpers::test_app_state();
    let (id, _) = test_helpers::seed_enterprise(&state, 10_000, 0).await;
    let input = NewProject {
        name: "前滩商业中心".into(),
        address: "前滩大道 8 号".into(),
        has_construction_permit: true,
        has_discharge_permit: false,
    };
    let project = add_project(&state, Actor::new(UserRole::Enterprise, id), id, input).await.unwrap();
    assert_eq!(project.status, ProjectStatus::Pending);
    assert!((project.location.lat - 31.22).abs() < f64::EPSILON);
    let sync = project.external_sync.unwrap();
    assert_eq!(sync.platform_name, SYNC_PLATFORM_NAME);
    assert_eq!(sync.sync_status, SyncStatus::Pending);
    let n: u32 = sync.external_id.strip_prefix("E-").unwrap().parse().unwrap();
    assert!(n < 10_000);
}

#[tokio::test]
async fn bulk_removal_books_credit_orders() {
    let state = test_helpers::test_app_state();
    let (id, project_id) = test_helpers::seed_enterprise(&state, 10_000, 0).await;

    let out = bulk_removal(&state, Actor::new(UserRole::Enterprise, id), id, removal(project_id, 3))
        .await
        .unwrap();
    assert_eq!(out.quote.price_per_truck, 650);
    assert_eq!(out.quote.total, 1_950);
    assert_eq!(out.available_credit, 8_050);
    assert_eq!(out.orders.len(), 3);

    let order = &out.orders[0];
    assert_eq!(order.status, OrderStatus::PendingPickup);
    assert_eq!(order.payment_status, Some(PaymentStatus::Credit));
    assert!(order.assigned_driver.is_none());
    let analysis = order.analysis.as_ref().unwrap();
    assert_eq!(analysis.estimated_price, 650);
    assert_eq!(analysis.estimated_volume, "1 车");
    assert_eq!(analysis.labor_service_recommendation, LaborServiceType::CarryAndLoad);
    assert_eq!(analysis.description, "企业批量清运订单 (1/3) - 测试大厦项目");
    assert_eq!(
        order.pickup_details.as_ref().and_then(|p| p.project_name.as_deref()),
        Some("测试大厦项目")
    );

    assert_eq!(project_cost(&state, id, project_id).await.unwrap(), 1_950);
}

#[tokio::test]
async fn bulk_removal_never_exceeds_credit() {
    let state = test_helpers::test_app_state();
    let (id, project_id) = test_helpers::seed_enterprise(&state, 2_000, 1_000).await;

    let err = bulk_removal(&state, Actor::new(UserRole::Enterprise, id), id, removal(project_id, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, EnterpriseError::CreditExceeded { needed: 1_300, available: 1_000 }));

    let store = state.store.read().await;
    assert!(store.orders.is_empty());
    assert_eq!(store.enterprises[&id].used_credit, 1_000);
}

#[tokio::test]
async fn bulk_removal_can_preassign_fleet() {
    let state = test_helpers::test_app_state();
    let (id, project_id) = test_helpers::seed_enterprise(&state, 10_000, 0).await;
    let (fleet_id, _) = test_helpers::seed_fleet(&state).await;
    let input = BulkRemoval { assign_fleet: Some(fleet_id), ..removal(project_id, 1) };

    let out = bulk_removal(&state, Actor::new(UserRole::Enterprise, id), id, input).await.unwrap();
    let assigned = out.orders[0].assigned_driver.clone().unwrap();
    assert_eq!(assigned.name, FLEET_DISPATCH_NAME);
    assert_eq!(assigned.plate, "待指派车辆");
    assert_eq!(assigned.fleet_id, Some(fleet_id));
    assert!(assigned.driver_id.is_none());
}

#[tokio::test]
async fn bulk_removal_rejects_bad_input() {
    let state = test_helpers::test_app_state();
    let (id, project_id) = test_helpers::seed_enterprise(&state, 10_000, 0).await;
    let me = Actor::new(UserRole::Enterprise, id);

    let err = bulk_removal(&state, me, id, removal(project_id, 0)).await.unwrap_err();
    assert!(matches!(err, EnterpriseError::NoTrucks));

    let err = bulk_removal(&state, me, id, removal(Uuid::new_v4(), 1)).await.unwrap_err();
    assert!(matches!(err, EnterpriseError::ProjectNotFound(_)));

    let other = Actor::new(UserRole::Enterprise, Uuid::new_v4());
    let err = bulk_removal(&state, other, id, removal(project_id, 1)).await.unwrap_err();
    assert!(matches!(err, EnterpriseError::Forbidden(_)));
}

#[tokio::test]
async fn procurement_posts_buy_order() {
    let state = test_helpers::test_app_state();
    let (id, project_id) = test_helpers::seed_enterprise(&state, 10_000, 0).await;
    let input = Procurement {
        project_id,
        product_type: RecycledProductType::Gravel,
        quantity: "200 吨".into(),
        target_price: 38.5,
    };
    let order = procurement(&state, Actor::new(UserRole::Enterprise, id), id, input).await.unwrap();
    assert_eq!(order.order_type, OrderType::RecycleTrade);
    assert_eq!(order.status, OrderStatus::PendingPickup);
    assert_eq!(order.trade_direction, Some(TradeDirection::Buy));
    assert_eq!(order.payment_status, Some(PaymentStatus::Credit));
    assert_eq!(order.buy_requirements.unwrap().quantity, "200 吨");
}
