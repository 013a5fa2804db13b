//! Application state.

use std::sync::Arc;

use shopledger_core::PackageCatalog;
use shopledger_store::RocksStore;

use crate::catalog::ProductCatalog;
use crate::checkout::CheckoutClient;
use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Credit packages available for purchase.
    pub packages: PackageCatalog,

    /// Trusted product catalog used to re-price order items.
    pub products: ProductCatalog,

    /// Payment platform client for checkout sessions (optional).
    pub checkout: Option<Arc<CheckoutClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        // Create checkout client if configured
        let checkout = config
            .checkout_api_url
            .as_ref()
            .zip(config.checkout_api_key.as_ref())
            .map(|(url, key)| {
                tracing::info!(checkout_url = %url, "Checkout integration enabled");
                Arc::new(CheckoutClient::new(url, key))
            });

        if checkout.is_none() {
            tracing::warn!("Checkout not configured - credit purchases will not be available");
        }

        // Load the product catalog from file if configured
        let products = match &config.product_catalog_path {
            Some(path) => match ProductCatalog::from_file(path) {
                Ok(catalog) => {
                    tracing::info!(path = %path, count = %catalog.len(), "Loaded product catalog");
                    catalog
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Failed to load product catalog, using defaults");
                    ProductCatalog::default()
                }
            },
            None => ProductCatalog::default(),
        };

        Self {
            store,
            config,
            packages: PackageCatalog::default(),
            products,
            checkout,
        }
    }
}
