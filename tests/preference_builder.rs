mod common;

use common::Harness;
use course_payments::gateways::mock::{MockBehavior, MockGateway};
use course_payments::service::preference_builder::PurchaseIntentError;
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn creates_intent_and_returns_gateway_redirect() {
    let h = Harness::new();
    let course_id = h.catalog.add("Async Rust", Some(Decimal::new(4999, 2)));
    let purchaser_id = h.users.add("u1@example.com");

    let intent = h
        .preference_builder()
        .create_purchase_intent(course_id, purchaser_id)
        .await
        .unwrap();

    assert_eq!(intent.preference_id, "pref_1");
    assert_eq!(intent.redirect_url, "https://pay/pref_1");
}

#[tokio::test]
async fn intent_carries_exactly_the_reconciliation_metadata() {
    let h = Harness::new();
    let course_id = h.catalog.add("Async Rust", Some(Decimal::new(4999, 2)));
    let purchaser_id = h.users.add("u1@example.com");

    h.preference_builder()
        .create_purchase_intent(course_id, purchaser_id)
        .await
        .unwrap();

    let submitted = h.gateway.submitted_intents();
    assert_eq!(submitted.len(), 1);
    let intent = &submitted[0];
    assert_eq!(intent.metadata.course_id, course_id.to_string());
    assert_eq!(intent.metadata.purchaser_id, purchaser_id.to_string());
    assert_eq!(intent.payer_email, "u1@example.com");

    assert_eq!(intent.items.len(), 1);
    assert_eq!(intent.items[0].quantity, 1);
    assert_eq!(intent.items[0].unit_price, Decimal::new(4999, 2));
    assert_eq!(intent.items[0].currency_id, "ARS");
    assert_eq!(
        intent.notification_url,
        "https://learn.example.com/api/payment/webhook?source_news=webhooks"
    );
    assert_eq!(
        intent.return_urls.success,
        format!("https://learn.example.com/courses/{course_id}/access?status=success")
    );
}

#[tokio::test]
async fn unsellable_prices_never_reach_the_gateway() {
    let h = Harness::new();
    let purchaser_id = h.users.add("u1@example.com");

    for price in [None, Some(Decimal::ZERO), Some(Decimal::new(-1000, 2))] {
        let course_id = h.catalog.add("Free-ish", price);
        let err = h
            .preference_builder()
            .create_purchase_intent(course_id, purchaser_id)
            .await
            .unwrap_err();
        assert!(
            matches!(err, PurchaseIntentError::CourseUnavailable(id) if id == course_id),
            "price {price:?} gave {err:?}"
        );
    }

    assert!(h.gateway.submitted_intents().is_empty());
}

#[tokio::test]
async fn missing_course_is_not_found() {
    let h = Harness::new();
    let purchaser_id = h.users.add("u1@example.com");

    let err = h
        .preference_builder()
        .create_purchase_intent(Uuid::new_v4(), purchaser_id)
        .await
        .unwrap_err();

    assert!(matches!(err, PurchaseIntentError::CourseNotFound(_)));
    assert!(h.gateway.submitted_intents().is_empty());
}

#[tokio::test]
async fn purchaser_without_email_is_unresolved() {
    let h = Harness::new();
    let course_id = h.catalog.add("Async Rust", Some(Decimal::new(4999, 2)));

    let err = h
        .preference_builder()
        .create_purchase_intent(course_id, Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, PurchaseIntentError::PurchaserContactUnresolved(_)));
    assert!(h.gateway.submitted_intents().is_empty());
}

#[tokio::test]
async fn gateway_rejection_keeps_diagnostic_payload() {
    let h = Harness::with_gateway(MockGateway::new("https://pay").with_behavior(MockBehavior::AlwaysReject));
    let course_id = h.catalog.add("Async Rust", Some(Decimal::new(4999, 2)));
    let purchaser_id = h.users.add("u1@example.com");

    let err = h
        .preference_builder()
        .create_purchase_intent(course_id, purchaser_id)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "GATEWAY_ERROR");
    let details = err.details().unwrap();
    assert_eq!(details["gateway_status"], 400);
    assert_eq!(details["gateway_response"]["message"], "mock decline");
}
