use super::*;
use serde_json::json;
use uuid::Uuid;

#[test]
fn role_parse_is_case_insensitive() {
    assert_eq!(UserRole::parse("driver"), Some(UserRole::Driver));
    assert_eq!(UserRole::parse(" FLEET "), Some(UserRole::Fleet));
    assert_eq!(UserRole::parse("admin"), None);
}

#[test]
fn role_wire_value_matches_as_str() {
    for role in UserRole::ALL {
        let wire = serde_json::to_value(role).unwrap();
        assert_eq!(wire, json!(role.as_str()));
    }
}

#[test]
fn waste_type_rejects_out_of_set_values() {
    let parsed: Result<WasteType, _> = serde_json::from_value(json!("ASBESTOS"));
    assert!(parsed.is_err());
    let parsed: WasteType = serde_json::from_value(json!("BULKY")).unwrap();
    assert_eq!(parsed, WasteType::Bulky);
}

#[test]
fn product_type_has_eight_values() {
    assert_eq!(RecycledProductType::ALL.len(), 8);
    for t in RecycledProductType::ALL {
        let back: RecycledProductType = serde_json::from_value(json!(t.as_str())).unwrap();
        assert_eq!(back, t);
    }
}

#[test]
fn product_analysis_uses_type_key() {
    let parsed: ProductAnalysis =
        serde_json::from_value(json!({ "type": "SCRAP_IRON", "quantity": "3 吨", "estimatedValue": 4200 }))
            .unwrap();
    assert_eq!(parsed.product_type, RecycledProductType::ScrapIron);
    assert_eq!(parsed.estimated_value, 4200);
}

#[test]
fn media_type_from_mime() {
    assert_eq!(MediaType::from_mime("video/mp4"), MediaType::Video);
    assert_eq!(MediaType::from_mime("image/png"), MediaType::Image);
}

#[test]
fn display_serial_falls_back_to_cert_prefix() {
    let order = Order::new(
        CustomerRef { role: UserRole::Client, id: Uuid::new_v4() },
        OrderType::WasteRemoval,
        OrderStatus::Created,
        GeoLocation::at(31.2, 121.5, "somewhere"),
        MediaType::Image,
        "",
    );
    let serial = order.display_serial();
    assert!(serial.starts_with("CERT-"));
    assert_eq!(serial.len(), "CERT-".len() + 8);
    assert_eq!(serial, serial.to_uppercase());
}

#[test]
fn display_serial_prefers_manifest() {
    let mut order = Order::new(
        CustomerRef { role: UserRole::Client, id: Uuid::new_v4() },
        OrderType::WasteRemoval,
        OrderStatus::Completed,
        GeoLocation::at(0.0, 0.0, ""),
        MediaType::Image,
        "",
    );
    order.manifest_serial_no = Some("MF-123456".into());
    assert_eq!(order.display_serial(), "MF-123456");
}

#[test]
fn order_serializes_camel_case() {
    let order = Order::new(
        CustomerRef { role: UserRole::Enterprise, id: Uuid::new_v4() },
        OrderType::RecycleTrade,
        OrderStatus::PendingPickup,
        GeoLocation::at(0.0, 0.0, "x"),
        MediaType::Image,
        "",
    );
    let value = serde_json::to_value(&order).unwrap();
    assert_eq!(value["orderType"], "RECYCLE_TRADE");
    assert_eq!(value["status"], "PENDING_PICKUP");
    assert_eq!(value["customer"]["role"], "ENTERPRISE");
    assert!(value.get("analysis").is_none());
}

#[test]
fn unknown_waste_always_accepted_by_facility() {
    let facility = Facility {
        id: Uuid::new_v4(),
        name: "site".into(),
        address: String::new(),
        location: GeoLocation::at(0.0, 0.0, ""),
        contact_phone: String::new(),
        status: VerificationStatus::Verified,
        joined_at: 0,
        operational_status: FacilityOperationalStatus::Open,
        facility_type: FacilityType::FixedDisposal,
        specialty: String::new(),
        allowed_waste_types: vec![WasteType::Construction],
        fee_configs: vec![],
        preferred_settlement: SettlementMethod::Platform,
        description: None,
    };
    assert!(facility.accepts(WasteType::Unknown));
    assert!(facility.accepts(WasteType::Construction));
    assert!(!facility.accepts(WasteType::Hazardous));
}

#[test]
fn notice_visibility() {
    let mut notice = Notice {
        id: Uuid::new_v4(),
        title: "t".into(),
        content: "c".into(),
        time: 0,
        kind: NoticeKind::Alert,
        target_roles: vec![],
    };
    assert!(notice.visible_to(UserRole::Client));
    notice.target_roles = vec![UserRole::Driver, UserRole::Fleet];
    assert!(notice.visible_to(UserRole::Fleet));
    assert!(!notice.visible_to(UserRole::Client));
}
