//! Payment webhook integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

fn credit_purchase_event(payment_id: &str, user_email: &str, package_id: &str) -> String {
    json!({
        "type": "payment.succeeded",
        "id": format!("evt_{payment_id}"),
        "data": {
            "id": payment_id,
            "session_id": "cs_test_1",
            "metadata": {
                "type": "credit_purchase",
                "package_id": package_id,
                "user_email": user_email,
                "credit_cents": 1,
                "bonus_cents": 1
            }
        }
    })
    .to_string()
}

async fn balance_cents(harness: &TestHarness, email: &str) -> i64 {
    let response = harness
        .server
        .get("/v1/credits/balance")
        .add_header("x-user-email", email.to_string())
        .await;
    let body: serde_json::Value = response.json();
    body["balance_cents"].as_i64().unwrap()
}

#[tokio::test]
async fn payment_succeeded_issues_catalog_priced_credits() {
    let harness = TestHarness::new();

    // Metadata claims 2 cents of credit; the catalog says pkg_50 is 5500
    let body = credit_purchase_event("pay_1", &harness.test_user_email, "pkg_50");
    let response = harness
        .server
        .post("/webhooks/payments")
        .add_header("x-payment-signature", harness.sign_webhook(&body))
        .text(body)
        .await;

    response.assert_status_ok();
    let resp: serde_json::Value = response.json();
    assert_eq!(resp["received"], true);

    assert_eq!(balance_cents(&harness, &harness.test_user_email).await, 5500);

    // The transaction records the purchase provenance
    let response = harness
        .server
        .get("/v1/credits/transactions")
        .add_header("x-user-email", harness.test_user_email.clone())
        .await;
    let body: serde_json::Value = response.json();
    let tx = &body["transactions"][0];
    assert_eq!(tx["transaction_type"], "purchase");
    assert_eq!(tx["metadata"]["kind"], "credit_purchase");
    assert_eq!(tx["metadata"]["payment_id"], "pay_1");
    assert_eq!(tx["metadata"]["credit_cents"], 5000);
    assert_eq!(tx["metadata"]["bonus_cents"], 500);
}

#[tokio::test]
async fn duplicate_payment_credits_exactly_once() {
    let harness = TestHarness::new();

    let body = credit_purchase_event("pay_dup", &harness.test_user_email, "pkg_25");
    let signature = harness.sign_webhook(&body);

    for _ in 0..3 {
        let response = harness
            .server
            .post("/webhooks/payments")
            .add_header("x-payment-signature", signature.clone())
            .text(body.clone())
            .await;

        // Redeliveries are acknowledged, not errored
        response.assert_status_ok();
    }

    assert_eq!(balance_cents(&harness, &harness.test_user_email).await, 2500);
}

#[tokio::test]
async fn missing_signature_is_unauthorized() {
    let harness = TestHarness::new();

    let body = credit_purchase_event("pay_2", &harness.test_user_email, "pkg_10");
    let response = harness
        .server
        .post("/webhooks/payments")
        .text(body)
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn invalid_signature_is_rejected() {
    let harness = TestHarness::new();

    let body = credit_purchase_event("pay_3", &harness.test_user_email, "pkg_10");
    let response = harness
        .server
        .post("/webhooks/payments")
        .add_header("x-payment-signature", "0".repeat(64))
        .text(body)
        .await;

    response.assert_status_bad_request();
    assert_eq!(balance_cents(&harness, &harness.test_user_email).await, 0);
}

#[tokio::test]
async fn missing_user_email_is_acknowledged_without_crediting() {
    let harness = TestHarness::new();

    let body = json!({
        "type": "payment.succeeded",
        "id": "evt_bad",
        "data": {
            "id": "pay_bad",
            "metadata": {
                "type": "credit_purchase",
                "package_id": "pkg_10"
            }
        }
    })
    .to_string();

    let response = harness
        .server
        .post("/webhooks/payments")
        .add_header("x-payment-signature", harness.sign_webhook(&body))
        .text(body)
        .await;

    // Retrying cannot fix the payload, so the event is acked
    response.assert_status_ok();
    assert_eq!(balance_cents(&harness, &harness.test_user_email).await, 0);
}

#[tokio::test]
async fn non_credit_purchase_payment_is_ignored() {
    let harness = TestHarness::new();

    let body = json!({
        "type": "payment.succeeded",
        "id": "evt_other",
        "data": {
            "id": "pay_other",
            "metadata": { "type": "something_else" }
        }
    })
    .to_string();

    let response = harness
        .server
        .post("/webhooks/payments")
        .add_header("x-payment-signature", harness.sign_webhook(&body))
        .text(body)
        .await;

    response.assert_status_ok();
    assert_eq!(balance_cents(&harness, &harness.test_user_email).await, 0);
}

#[tokio::test]
async fn payment_failed_is_acknowledged() {
    let harness = TestHarness::new();

    let body = json!({
        "type": "payment.failed",
        "id": "evt_fail",
        "data": { "id": "pay_fail" }
    })
    .to_string();

    let response = harness
        .server
        .post("/webhooks/payments")
        .add_header("x-payment-signature", harness.sign_webhook(&body))
        .text(body)
        .await;

    response.assert_status_ok();
}
