use super::*;
use crate::model::OrderType;
use crate::state::test_helpers;

fn gov() -> Actor {
    Actor::new(UserRole::Government, Uuid::new_v4())
}

fn notice(title: &str, targets: Vec<UserRole>) -> NewNotice {
    NewNotice { title: title.into(), content: "内容".into(), kind: NoticeKind::Notice, target_roles: targets }
}

fn dumping() -> NewComplaint {
    NewComplaint {
        kind: ComplaintKind::IllegalDumping,
        location: GeoLocation::at(31.22, 121.62, "科苑路188号路口"),
        description: "人行道堆放装修垃圾".into(),
        media: String::new(),
    }
}

#[tokio::test]
async fn notices_are_filtered_by_role_newest_first() {
    let state = test_helpers::test_app_state();
    let first = publish(&state, gov(), notice("全体通知", Vec::new())).await.unwrap();
    let second = publish(&state, gov(), notice("消纳场通知", vec![UserRole::Disposal])).await.unwrap();
    state.store.write().await.notices[0].time -= 1_000;

    let disposal = notices_for(&state, UserRole::Disposal).await;
    assert_eq!(disposal.iter().map(|n| n.id).collect::<Vec<_>>(), vec![second.id, first.id]);
    let client = notices_for(&state, UserRole::Client).await;
    assert_eq!(client.iter().map(|n| n.id).collect::<Vec<_>>(), vec![first.id]);
}

#[tokio::test]
async fn notice_needs_title_content_and_government() {
    let state = test_helpers::test_app_state();
    let err = publish(&state, gov(), notice("  ", Vec::new())).await.unwrap_err();
    assert!(matches!(err, GovernanceError::MissingField("title")));

    let blank = NewNotice { content: String::new(), ..notice("标题", Vec::new()) };
    let err = publish(&state, gov(), blank).await.unwrap_err();
    assert!(matches!(err, GovernanceError::MissingField("content")));

    let client = Actor::new(UserRole::Client, Uuid::new_v4());
    let err = publish(&state, client, notice("标题", Vec::new())).await.unwrap_err();
    assert!(matches!(err, GovernanceError::Forbidden(_)));
    assert!(state.store.read().await.notices.is_empty());
}

#[tokio::test]
async fn complaint_lifecycle() {
    let state = test_helpers::test_app_state();
    let citizen = Actor::new(UserRole::Client, Uuid::new_v4());
    let complaint = file(&state, citizen, dumping()).await.unwrap();
    assert_eq!(complaint.status, ComplaintStatus::Pending);

    let other = Actor::new(UserRole::Client, Uuid::new_v4());
    assert!(complaints(&state, other).await.is_empty());
    assert_eq!(complaints(&state, citizen).await.len(), 1);
    assert_eq!(stats(&state).await.pending_complaints, 1);

    let err = resolve(&state, citizen, complaint.id).await.unwrap_err();
    assert!(matches!(err, GovernanceError::Forbidden(_)));
    let resolved = resolve(&state, gov(), complaint.id).await.unwrap();
    assert_eq!(resolved.status, ComplaintStatus::Resolved);
    assert_eq!(stats(&state).await.pending_complaints, 0);

    let err = resolve(&state, gov(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, GovernanceError::ComplaintNotFound(_)));
}

#[tokio::test]
async fn stats_count_five_cubic_metres_per_truck() {
    let state = test_helpers::test_app_state();
    let client = Actor::new(UserRole::Client, Uuid::new_v4());
    for _ in 0..3 {
        test_helpers::seed_order(&state, client, OrderType::WasteRemoval, OrderStatus::Completed).await;
    }
    test_helpers::seed_order(&state, client, OrderType::WasteRemoval, OrderStatus::InProgress).await;

    let stats = stats(&state).await;
    assert_eq!(stats.completed_count, 3);
    assert_eq!(stats.total_volume_m3, 15);
}
