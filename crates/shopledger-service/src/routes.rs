//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{credits, health, orders, webhooks};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /v1/credits/packages` - Available credit packages
///
/// ## Credits (user identity auth)
/// - `GET /v1/credits/balance` - Get current balance
/// - `GET /v1/credits/transactions` - List transaction history
/// - `POST /v1/credits/purchase` - Initiate credit package purchase
///
/// ## Orders (user identity auth)
/// - `POST /v1/orders` - Settle an order from credits
/// - `GET /v1/orders` - List the user's orders
/// - `GET /v1/orders/:id` - Get an order
///
/// ## Admin (service API key auth)
/// - `POST /v1/credits/adjust` - Grant credits (bonus/promo/correction)
///
/// ## Webhooks (signature verification)
/// - `POST /webhooks/payments` - Payment platform events
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Credits
        .route("/v1/credits/balance", get(credits::get_balance))
        .route("/v1/credits/transactions", get(credits::list_transactions))
        .route("/v1/credits/packages", get(credits::list_packages))
        .route("/v1/credits/purchase", post(credits::purchase_credits))
        .route("/v1/credits/adjust", post(credits::adjust_credits))
        // Orders
        .route("/v1/orders", post(orders::create_order))
        .route("/v1/orders", get(orders::list_orders))
        .route("/v1/orders/:order_id", get(orders::get_order))
        // Webhooks
        .route("/webhooks/payments", post(webhooks::payment_webhook))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
