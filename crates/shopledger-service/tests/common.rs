//! Common test utilities for shopledger integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use shopledger_service::{create_router, crypto, AppState, ServiceConfig};
use shopledger_store::RocksStore;

/// The webhook signing secret used by every test harness.
pub const WEBHOOK_SECRET: &str = "whsec_test";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user email for authenticated requests.
    pub test_user_email: String,
    /// The service API key for service-to-service requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness after adjusting the default configuration.
    pub fn with_config(adjust: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let service_api_key = "test-service-key".to_string();

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            service_api_key: Some(service_api_key.clone()),
            checkout_api_url: None,
            checkout_api_key: None,
            webhook_secret: Some(WEBHOOK_SECRET.into()),
            frontend_url: "http://localhost:3000".into(),
            product_catalog_path: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };
        adjust(&mut config);

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            test_user_email: "buyer@example.com".into(),
            service_api_key,
        }
    }

    /// Grant the test user credits through the admin endpoint.
    pub async fn grant_credits(&self, amount_cents: i64) {
        self.server
            .post("/v1/credits/adjust")
            .add_header("x-api-key", self.service_api_key.clone())
            .json(&serde_json::json!({
                "user_email": self.test_user_email,
                "amount_cents": amount_cents,
                "reason": "test grant"
            }))
            .await
            .assert_status_ok();
    }

    /// Sign a webhook body with the harness's webhook secret.
    pub fn sign_webhook(&self, body: &str) -> String {
        crypto::hmac_sha256_hex(WEBHOOK_SECRET, body)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
