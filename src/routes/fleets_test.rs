use super::*;

#[test]
fn fleet_error_to_status_maps_lookups_to_not_found() {
    let id = Uuid::new_v4();
    assert_eq!(fleet_error_to_status(&FleetError::NotFound(id)), StatusCode::NOT_FOUND);
    assert_eq!(fleet_error_to_status(&FleetError::DriverNotFound(id)), StatusCode::NOT_FOUND);
    assert_eq!(fleet_error_to_status(&FleetError::ProjectNotFound(id)), StatusCode::NOT_FOUND);
}

#[test]
fn fleet_error_to_status_maps_duplicates_and_input() {
    assert_eq!(fleet_error_to_status(&FleetError::AlreadyRegistered(Uuid::new_v4())), StatusCode::CONFLICT);
    assert_eq!(fleet_error_to_status(&FleetError::MissingField("name")), StatusCode::BAD_REQUEST);
    assert_eq!(fleet_error_to_status(&FleetError::Forbidden("x".into())), StatusCode::FORBIDDEN);
}

#[test]
fn ledger_query_parses_filter() {
    let q: LedgerQuery = serde_json::from_str(r#"{"filter":"UNSETTLED","search":"沪A"}"#).unwrap();
    assert_eq!(q.filter, LedgerFilter::Unsettled);
    assert_eq!(q.search.as_deref(), Some("沪A"));
}
