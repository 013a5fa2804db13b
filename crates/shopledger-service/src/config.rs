//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/shopledger").
    pub data_dir: String,

    /// Service API key for service-to-service auth (admin adjustments).
    pub service_api_key: Option<String>,

    /// Payment platform API base URL (optional).
    pub checkout_api_url: Option<String>,

    /// Payment platform API key (optional).
    pub checkout_api_key: Option<String>,

    /// Webhook signing secret for payment events (optional).
    pub webhook_secret: Option<String>,

    /// Frontend URL for checkout redirects.
    pub frontend_url: String,

    /// Path to a JSON product catalog file (optional, built-in defaults
    /// are used when absent).
    pub product_catalog_path: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Payment platform secrets file structure.
#[derive(Debug, Deserialize)]
struct CheckoutSecrets {
    api_url: String,
    api_key: String,
    #[serde(default)]
    webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        // Try to load checkout secrets from file first, then fall back to env vars
        let (checkout_api_url, checkout_api_key, webhook_secret) = load_checkout_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/shopledger".into()),
            service_api_key: std::env::var("SERVICE_API_KEY").ok(),
            checkout_api_url,
            checkout_api_key,
            webhook_secret,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            product_catalog_path: std::env::var("PRODUCT_CATALOG_PATH").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

/// Load payment platform secrets from file or environment.
fn load_checkout_secrets() -> (Option<String>, Option<String>, Option<String>) {
    // Try multiple paths for the secrets file
    let secret_paths = [
        ".secrets/checkout.json",
        "shopledger/.secrets/checkout.json",
        "../.secrets/checkout.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<CheckoutSecrets>(path) {
            tracing::info!(path = %path, "Loaded checkout secrets from file");
            return (
                Some(secrets.api_url),
                Some(secrets.api_key),
                secrets.webhook_secret,
            );
        }
    }

    // Fall back to environment variables
    tracing::debug!("Checkout secrets file not found, using environment variables");
    (
        std::env::var("CHECKOUT_API_URL").ok(),
        std::env::var("CHECKOUT_API_KEY").ok(),
        std::env::var("WEBHOOK_SECRET").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/shopledger".into(),
            service_api_key: None,
            checkout_api_url: None,
            checkout_api_key: None,
            webhook_secret: None,
            frontend_url: "http://localhost:3000".into(),
            product_catalog_path: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
