//! Payment platform webhook handler.
//!
//! Credit purchases settle on the payment platform; the platform then posts
//! a `payment.succeeded` event here, and this handler issues the credits.
//! Events are acknowledged with 200 whenever retrying cannot help (malformed
//! metadata, already-processed payment), so the platform does not redeliver
//! them forever.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use shopledger_core::{TransactionMetadata, UserId};
use shopledger_store::{Store, StoreError};

use crate::checkout::CheckoutMetadata;
use crate::crypto;
use crate::error::ApiError;
use crate::state::AppState;

/// Payment platform webhook payload.
#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event ID.
    pub id: String,
    /// The payment the event describes.
    pub data: PaymentEventData,
}

/// Payment object carried by a webhook event.
#[derive(Debug, Deserialize)]
pub struct PaymentEventData {
    /// Platform payment id (the idempotency key for credit issuance).
    pub id: String,
    /// Checkout session that produced this payment, if any.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Metadata echoed back from the checkout session.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was processed.
    pub received: bool,
}

/// Handle payment platform webhooks.
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    // Verify signature if a webhook secret is configured
    if let Some(secret) = &state.config.webhook_secret {
        let signature = headers
            .get("x-payment-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        if !crypto::verify_signature(secret, &body, signature) {
            tracing::warn!("Invalid payment webhook signature");
            return Err(ApiError::BadRequest("Invalid webhook signature".into()));
        }
    } else {
        // No webhook secret configured - skip verification (development mode)
        tracing::warn!("Webhook secret not configured - skipping signature verification");
    }

    // Parse webhook payload
    let webhook: PaymentWebhook =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(
        event_type = %webhook.event_type,
        event_id = %webhook.id,
        payment_id = %webhook.data.id,
        "Received payment webhook"
    );

    match webhook.event_type.as_str() {
        "payment.succeeded" => {
            handle_payment_succeeded(&state, &webhook.data)?;
        }
        "payment.failed" => {
            tracing::warn!(payment_id = %webhook.data.id, "Payment failed");
        }
        _ => {
            tracing::debug!(event_type = %webhook.event_type, "Unhandled payment event");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}

/// Issue credits for a succeeded payment.
///
/// The credit amount comes from the package catalog, never from the webhook
/// metadata: the metadata only identifies which package was purchased.
fn handle_payment_succeeded(
    state: &AppState,
    payment: &PaymentEventData,
) -> Result<(), ApiError> {
    let Some(metadata) = &payment.metadata else {
        tracing::debug!(payment_id = %payment.id, "Payment has no metadata, ignoring");
        return Ok(());
    };

    // Only credit-purchase payments are ours to process
    let purchase_type = metadata.get("type").and_then(|v| v.as_str());
    if purchase_type != Some(CheckoutMetadata::CREDIT_PURCHASE) {
        tracing::debug!(
            payment_id = %payment.id,
            purchase_type = ?purchase_type,
            "Not a credit purchase, ignoring"
        );
        return Ok(());
    }

    let user_email = metadata.get("user_email").and_then(|v| v.as_str());
    let package_id = metadata.get("package_id").and_then(|v| v.as_str());

    // Malformed metadata cannot be fixed by redelivery: log and acknowledge
    let (Some(user_email), Some(package_id)) = (user_email, package_id) else {
        tracing::warn!(
            payment_id = %payment.id,
            "Credit purchase missing user_email or package_id, acknowledging without crediting"
        );
        return Ok(());
    };

    let Ok(user_id) = UserId::new(user_email) else {
        tracing::warn!(
            payment_id = %payment.id,
            user_email = %user_email,
            "Credit purchase has invalid user email, acknowledging without crediting"
        );
        return Ok(());
    };

    // Disabled packages are still honored: the session predates the retirement
    let Some(package) = state.packages.find(package_id) else {
        tracing::warn!(
            payment_id = %payment.id,
            package_id = %package_id,
            "Credit purchase references unknown package, acknowledging without crediting"
        );
        return Ok(());
    };

    let total_cents = package.total_credit_cents();
    let result = state.store.credit_from_payment(
        &payment.id,
        &user_id,
        total_cents,
        format!("Credit purchase: {}", package.name),
        TransactionMetadata::CreditPurchase {
            package_id: package.id.clone(),
            payment_id: payment.id.clone(),
            session_id: payment.session_id.clone(),
            credit_cents: package.amount_cents,
            bonus_cents: package.bonus_cents,
        },
    );

    match result {
        Ok(tx) => {
            tracing::info!(
                user_id = %user_id,
                payment_id = %payment.id,
                package_id = %package.id,
                credits_added = %total_cents,
                new_balance = %tx.balance_after_cents,
                transaction_id = %tx.id,
                "Credits issued from payment"
            );
            Ok(())
        }
        // Redelivered event: already credited, acknowledge
        Err(StoreError::DuplicatePayment { payment_id }) => {
            tracing::info!(
                payment_id = %payment_id,
                "Payment already processed, acknowledging"
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
