use super::*;
use crate::model::{OrderType, WasteType};

#[test]
fn order_error_to_status_maps_lookups_to_not_found() {
    let id = Uuid::new_v4();
    assert_eq!(order_error_to_status(&OrderError::NotFound(id)), StatusCode::NOT_FOUND);
    assert_eq!(order_error_to_status(&OrderError::DriverNotFound(id)), StatusCode::NOT_FOUND);
    assert_eq!(order_error_to_status(&OrderError::FacilityNotFound(id)), StatusCode::NOT_FOUND);
}

#[test]
fn order_error_to_status_maps_state_conflicts() {
    let err = OrderError::IllegalTransition {
        from: OrderStatus::Completed,
        to: OrderStatus::InProgress,
        order_type: OrderType::WasteRemoval,
    };
    assert_eq!(order_error_to_status(&err), StatusCode::CONFLICT);
    assert_eq!(order_error_to_status(&OrderError::AlreadyAssigned), StatusCode::CONFLICT);
    assert_eq!(order_error_to_status(&OrderError::FacilityFull), StatusCode::CONFLICT);
}

#[test]
fn order_error_to_status_maps_bad_input() {
    assert_eq!(order_error_to_status(&OrderError::MissingPhoto), StatusCode::BAD_REQUEST);
    assert_eq!(
        order_error_to_status(&OrderError::WasteNotAccepted(WasteType::Hazardous)),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn order_error_to_status_maps_forbidden_and_unverified() {
    assert_eq!(order_error_to_status(&OrderError::Forbidden("x".into())), StatusCode::FORBIDDEN);
    assert_eq!(order_error_to_status(&OrderError::DriverNotVerified), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn api_error_keeps_the_service_code() {
    let err = ApiError::from(OrderError::DriverBusy);
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.code, "E_DRIVER_BUSY");
    assert!(!err.retryable);
}
