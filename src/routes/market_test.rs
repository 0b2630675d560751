use super::*;
use uuid::Uuid;

#[test]
fn market_error_to_status_maps_each_variant() {
    assert_eq!(market_error_to_status(&MarketError::FacilityNotFound(Uuid::new_v4())), StatusCode::NOT_FOUND);
    assert_eq!(market_error_to_status(&MarketError::MissingField("image")), StatusCode::BAD_REQUEST);
    assert_eq!(market_error_to_status(&MarketError::Forbidden("x".into())), StatusCode::FORBIDDEN);
}

#[test]
fn product_query_is_optional() {
    let q: ProductQuery = serde_json::from_str("{}").unwrap();
    assert!(q.product_type.is_none());
    assert!(q.search.is_none());
}
