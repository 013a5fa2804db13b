//! Payment platform checkout client.
//!
//! Credit purchases are settled on an external payment platform. The service
//! creates a checkout session for the chosen credit package and hands the
//! session URL back to the frontend; the platform later confirms the payment
//! via webhook.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Error type for checkout operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The payment platform returned an error.
    #[error("checkout API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the platform.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
}

/// Metadata attached to a checkout session.
///
/// The platform echoes this back verbatim in the `payment.succeeded`
/// webhook, which is how a payment is tied back to a credit purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    /// Discriminator checked by the webhook handler.
    #[serde(rename = "type")]
    pub purchase_type: String,
    /// The credit package being purchased.
    pub package_id: String,
    /// The purchasing user (normalized email).
    pub user_email: String,
    /// Base credits in the package, in cents.
    pub credit_cents: i64,
    /// Bonus credits in the package, in cents.
    pub bonus_cents: i64,
}

impl CheckoutMetadata {
    /// The metadata type that marks a session as a credit purchase.
    pub const CREDIT_PURCHASE: &'static str = "credit_purchase";
}

/// A checkout session created on the payment platform.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Platform-assigned session id.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    plan_id: &'a str,
    redirect_url: &'a str,
    metadata: &'a CheckoutMetadata,
}

/// Payment platform API client.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CheckoutClient {
    /// Create a new checkout client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Create a checkout session for a payment plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the platform rejects it.
    pub async fn create_checkout_session(
        &self,
        plan_id: &str,
        redirect_url: &str,
        metadata: &CheckoutMetadata,
    ) -> Result<CheckoutSession, CheckoutError> {
        let response = self
            .client
            .post(format!("{}/v1/checkout-sessions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CreateSessionRequest {
                plan_id,
                redirect_url,
                metadata,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// The hosted checkout page URL for a session.
    #[must_use]
    pub fn checkout_url(&self, session_id: &str) -> String {
        format!("{}/checkout/{}", self.base_url, session_id)
    }
}
