use super::*;
use crate::services::order;
use crate::state::test_helpers;

const COMMUNITY: &str = "测试花园";

fn renovation(community: &str, project_type: RenovationType, company: Option<&str>) -> NewRenovation {
    NewRenovation {
        applicant_name: "刘女士".into(),
        applicant_phone: "13600000000".into(),
        applicant_role: ApplicantRole::Owner,
        project_type,
        community_name: community.into(),
        room_number: "1502".into(),
        renovation_company: company.map(str::to_string),
        start_date: now_ms(),
        estimated_duration_days: 60,
    }
}

fn clearance(supplier_id: Uuid, application_id: Option<Uuid>) -> Clearance {
    Clearance {
        community: COMMUNITY.into(),
        building: "12".into(),
        unit: "2".into(),
        room: "1502".into(),
        media: "data:image/jpeg;base64,AAAA".into(),
        supplier_id,
        application_id,
    }
}

fn owner() -> Actor {
    Actor::new(UserRole::Client, Uuid::new_v4())
}

#[tokio::test]
async fn approval_issues_permit_number() {
    let state = test_helpers::test_app_state();
    let (pid, _) = test_helpers::seed_property(&state, COMMUNITY).await;
    let manager = Actor::new(UserRole::Property, pid);
    let app = submit(&state, owner(), renovation(COMMUNITY, RenovationType::Residential, None)).await.unwrap();
    assert_eq!(app.status, ProjectStatus::Pending);

    let app = approve(&state, manager, app.id).await.unwrap();
    assert_eq!(app.status, ProjectStatus::Approved);
    let permit = app.permit_id.unwrap();
    let parts: Vec<&str> = permit.split('-').collect();
    assert_eq!(parts[0], "PMT");
    assert_eq!(parts[1], time::OffsetDateTime::now_utc().year().to_string());
    assert_eq!(parts[2].len(), 4);
    assert!(parts[2].chars().all(|c| c.is_ascii_digit()));

    let err = reject(&state, manager, app.id).await.unwrap_err();
    assert!(matches!(err, PropertyError::AlreadyReviewed));
}

#[tokio::test]
async fn rejection_leaves_no_permit() {
    let state = test_helpers::test_app_state();
    let (pid, _) = test_helpers::seed_property(&state, COMMUNITY).await;
    let app = submit(&state, owner(), renovation(COMMUNITY, RenovationType::Residential, None)).await.unwrap();
    let app = reject(&state, Actor::new(UserRole::Property, pid), app.id).await.unwrap();
    assert_eq!(app.status, ProjectStatus::Rejected);
    assert!(app.permit_id.is_none());
}

#[tokio::test]
async fn manager_cannot_review_other_communities() {
    let state = test_helpers::test_app_state();
    let (pid, _) = test_helpers::seed_property(&state, COMMUNITY).await;
    let app = submit(&state, owner(), renovation("别的小区", RenovationType::Residential, None)).await.unwrap();
    let err = approve(&state, Actor::new(UserRole::Property, pid), app.id).await.unwrap_err();
    assert!(matches!(err, PropertyError::CommunityNotManaged(_)));
}

#[tokio::test]
async fn lists_hold_residential_managed_applications() {
    let state = test_helpers::test_app_state();
    let (pid, _) = test_helpers::seed_property(&state, COMMUNITY).await;
    let manager = Actor::new(UserRole::Property, pid);
    let mine = submit(&state, owner(), renovation(COMMUNITY, RenovationType::Residential, None)).await.unwrap();
    submit(&state, owner(), renovation(COMMUNITY, RenovationType::Commercial, None)).await.unwrap();
    submit(&state, owner(), renovation("别的小区", RenovationType::Residential, None)).await.unwrap();

    let pending = applications(&state, manager, pid, ProjectStatus::Pending).await.unwrap();
    assert_eq!(pending.iter().map(|a| a.id).collect::<Vec<_>>(), vec![mine.id]);

    approve(&state, manager, mine.id).await.unwrap();
    assert!(applications(&state, manager, pid, ProjectStatus::Pending).await.unwrap().is_empty());
    assert_eq!(applications(&state, manager, pid, ProjectStatus::Approved).await.unwrap().len(), 1);
}

#[tokio::test]
async fn clearance_is_preassigned_monthly_bill() {
    let state = test_helpers::test_app_state();
    let (pid, supplier) = test_helpers::seed_property(&state, COMMUNITY).await;
    let manager = Actor::new(UserRole::Property, pid);
    let app = submit(&state, owner(), renovation(COMMUNITY, RenovationType::Residential, Some("美家装饰"))).await.unwrap();

    let order = dispatch_clearance(&state, manager, pid, clearance(supplier, Some(app.id))).await.unwrap();
    assert_eq!(order.status, OrderStatus::Analyzing);
    assert_eq!(order.order_type, OrderType::WasteRemoval);
    assert_eq!(order.payment_status, Some(PaymentStatus::MonthlyBill));
    assert_eq!(order.location.address.as_deref(), Some("测试花园 12-2-1502"));

    let pickup = order.pickup_details.as_ref().unwrap();
    assert_eq!(pickup.contractor_name.as_deref(), Some("美家装饰"));
    assert_eq!(pickup.room_number.as_deref(), Some("1502"));

    let driver = order.assigned_driver.as_ref().unwrap();
    assert_eq!(driver.fleet_id, Some(supplier));
    assert_eq!(driver.fleet_name.as_deref(), Some("测试清运车队"));
    assert_eq!(driver.plate, PENDING_PLATE);

    let analysis = order.analysis.as_ref().unwrap();
    assert_eq!(analysis.waste_type, WasteType::Construction);
    assert_eq!(analysis.estimated_price, CLEARANCE_PRICE);
    assert_eq!(analysis.description, "物业代报: 12栋1502");

    let confirmed = order::confirm(&state, manager, order.id).await.unwrap();
    assert_eq!(confirmed.status, OrderStatus::PendingPickup);
}

#[tokio::test]
async fn clearance_without_application_is_self_renovation() {
    let state = test_helpers::test_app_state();
    let (pid, supplier) = test_helpers::seed_property(&state, COMMUNITY).await;
    let order = dispatch_clearance(&state, Actor::new(UserRole::Property, pid), pid, clearance(supplier, None))
        .await
        .unwrap();
    assert_eq!(order.pickup_details.unwrap().contractor_name.as_deref(), Some(SELF_RENOVATION));
}

#[tokio::test]
async fn clearance_checks_input_and_supplier() {
    let state = test_helpers::test_app_state();
    let (pid, supplier) = test_helpers::seed_property(&state, COMMUNITY).await;
    let manager = Actor::new(UserRole::Property, pid);

    let err = dispatch_clearance(&state, manager, pid, Clearance { room: " ".into(), ..clearance(supplier, None) })
        .await
        .unwrap_err();
    assert!(matches!(err, PropertyError::MissingField("room")));

    let err = dispatch_clearance(&state, manager, pid, clearance(Uuid::new_v4(), None)).await.unwrap_err();
    assert!(matches!(err, PropertyError::SupplierNotFound(_)));

    let err = dispatch_clearance(&state, manager, pid, Clearance { community: "别的小区".into(), ..clearance(supplier, None) })
        .await
        .unwrap_err();
    assert!(matches!(err, PropertyError::CommunityNotManaged(_)));

    let outsider = Actor::new(UserRole::Property, Uuid::new_v4());
    let err = dispatch_clearance(&state, outsider, pid, clearance(supplier, None)).await.unwrap_err();
    assert!(matches!(err, PropertyError::Forbidden(_)));
}

#[tokio::test]
async fn unsettled_counts_open_monthly_bills() {
    let state = test_helpers::test_app_state();
    let (pid, supplier) = test_helpers::seed_property(&state, COMMUNITY).await;
    let manager = Actor::new(UserRole::Property, pid);
    dispatch_clearance(&state, manager, pid, clearance(supplier, None)).await.unwrap();
    let done = dispatch_clearance(&state, manager, pid, clearance(supplier, None)).await.unwrap();
    state.store.write().await.orders.get_mut(&done.id).unwrap().status = OrderStatus::Completed;

    assert_eq!(unsettled_amount(&state, manager, pid).await.unwrap(), CLEARANCE_PRICE);
    assert_eq!(community_orders(&state, manager, pid).await.unwrap().len(), 2);
}
