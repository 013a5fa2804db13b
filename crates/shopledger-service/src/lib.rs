//! Shopledger HTTP API Service.
//!
//! This crate provides the HTTP API for the shopledger service, including:
//!
//! - Credit balance and transaction history
//! - Credit package purchase initiation (checkout sessions)
//! - Order settlement from credits
//! - Payment-platform webhooks
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **User identity headers** - For end-user requests, asserted by the
//!    session-terminating frontend (`x-user-email`)
//! 2. **Service API keys** - For service-to-service requests (`x-api-key`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Some handlers need async only for routing

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use catalog::{Product, ProductCatalog};
pub use checkout::{CheckoutClient, CheckoutError};
pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
