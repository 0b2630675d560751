use super::*;
use axum::body::Body;
use axum::http::{Request, Response};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::model::{Actor, OrderStatus, OrderType, UserRole};
use crate::routes::actor::{ACTOR_HEADER, ROLE_HEADER};
use crate::seed::{self, ids};
use crate::state::test_helpers::{seed_order, test_app_state, test_config};

fn request(method: &str, uri: &str, who: Option<(&str, Uuid)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((role, id)) = who {
        builder = builder.header(ROLE_HEADER, role).header(ACTOR_HEADER, id.to_string());
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(res: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let res = app(test_app_state()).oneshot(request("GET", "/healthz", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let res = app(test_app_state()).oneshot(request("GET", "/api/orders", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(res).await;
    assert_eq!(body["code"], "E_UNAUTHORIZED");
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn public_reads_need_no_identity() {
    let state = AppState::with_store(test_config(), None, seed::demo_store());
    let res = app(state.clone()).oneshot(request("GET", "/api/facilities", None, None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await.as_array().map(Vec::len), Some(2));

    let res = app(state)
        .oneshot(request("GET", "/api/pricing/quote?wasteType=CONSTRUCTION&labor=NONE", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(json_body(res).await["total"].as_i64().is_some());
}

#[tokio::test]
async fn create_order_without_llm_uses_fallback() {
    let state = test_app_state();
    let customer = Uuid::new_v4();
    let body = json!({
        "media": "data:image/jpeg;base64,AAAA",
        "location": { "lat": 31.23, "lng": 121.47, "address": "上海市浦东新区张江路 88 号" }
    });
    let res = app(state.clone())
        .oneshot(request("POST", "/api/orders", Some(("CLIENT", customer)), Some(body)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = json_body(res).await;
    assert_eq!(created["fallback"], true);
    assert_eq!(created["order"]["status"], "REVIEW_REQUIRED");

    let res = app(state)
        .oneshot(request("GET", "/api/orders?view=mine", Some(("CLIENT", customer)), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let uri = format!("/api/orders/{}", Uuid::new_v4());
    let res = app(test_app_state())
        .oneshot(request("GET", &uri, Some(("DRIVER", Uuid::new_v4())), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(res).await["code"], "E_ORDER_NOT_FOUND");
}

#[tokio::test]
async fn wrong_role_transition_is_forbidden() {
    let state = test_app_state();
    let customer = Actor::new(UserRole::Client, Uuid::new_v4());
    let id = seed_order(&state, customer, OrderType::WasteRemoval, OrderStatus::ReviewRequired).await;

    let uri = format!("/api/orders/{id}/confirm");
    let res = app(state)
        .oneshot(request("POST", &uri, Some(("DRIVER", Uuid::new_v4())), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn seeded_order_completes_with_verified_manifest() {
    let state = AppState::with_store(test_config(), None, seed::demo_store());
    let order_id = {
        let store = state.store.read().await;
        store
            .orders
            .values()
            .find(|o| o.status == OrderStatus::ArrivedDisposal)
            .map(|o| o.id)
            .unwrap()
    };

    let uri = format!("/api/orders/{order_id}/disposal-entry");
    let res = app(state.clone())
        .oneshot(request(
            "POST",
            &uri,
            Some(("DISPOSAL", ids::FACILITY_PUDONG)),
            Some(json!({ "entryPhoto": "gate.jpg" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["order"]["status"], "COMPLETED");

    let uri = format!("/api/orders/{order_id}/manifest");
    let res = app(state)
        .oneshot(request("GET", &uri, Some(("GOVERNMENT", ids::GOVERNMENT)), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let manifest = json_body(res).await;
    assert_eq!(manifest["verified"], true);
    assert_eq!(manifest["fee"], 450);
    assert!(manifest["displaySerial"].as_str().is_some_and(|s| s.starts_with("MF-")));
}

#[tokio::test]
async fn order_without_manifest_shows_cert_serial() {
    let state = test_app_state();
    let customer = Actor::new(UserRole::Client, Uuid::new_v4());
    let id = seed_order(&state, customer, OrderType::WasteRemoval, OrderStatus::PendingPickup).await;

    let uri = format!("/api/orders/{id}/manifest");
    let res = app(state)
        .oneshot(request("GET", &uri, Some(("CLIENT", customer.id)), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let view = json_body(res).await;
    let simple = id.simple().to_string();
    let expected = format!("CERT-{}", simple[simple.len() - 8..].to_uppercase());
    assert_eq!(view["displaySerial"], expected.as_str());
    assert_eq!(view["verified"], false);
    assert!(view.get("digest").is_none());
}

#[tokio::test]
async fn large_media_body_reaches_classifier() {
    let body = json!({
        "media": "A".repeat(3 * 1024 * 1024),
        "mediaType": "VIDEO",
        "mimeType": "video/mp4"
    });
    let res = app(test_app_state())
        .oneshot(request("POST", "/api/ai/waste", Some(("CLIENT", Uuid::new_v4())), Some(body)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["fallback"], true);
}

#[tokio::test]
async fn media_body_over_configured_limit_is_rejected() {
    let mut config = test_config();
    config.max_body_bytes = 1024;
    let state = AppState::with_store(config, None, crate::state::Store::default());
    let body = json!({ "media": "A".repeat(4096) });
    let res = app(state)
        .oneshot(request("POST", "/api/ai/waste", Some(("CLIENT", Uuid::new_v4())), Some(body)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn empty_copilot_message_is_bad_request() {
    let res = app(test_app_state())
        .oneshot(request(
            "POST",
            "/api/copilot/chat",
            Some(("CLIENT", Uuid::new_v4())),
            Some(json!({ "message": "   " })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["code"], "E_EMPTY_MESSAGE");
}

#[tokio::test]
async fn dashboard_reports_role_counters() {
    let state = AppState::with_store(test_config(), None, seed::demo_store());
    let res = app(state)
        .oneshot(request("GET", "/api/dashboard", Some(("GOVERNMENT", ids::GOVERNMENT)), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["role"], "GOVERNMENT");
    assert_eq!(body["counters"]["kind"], "GOVERNMENT");
}
