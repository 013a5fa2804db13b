//! Trusted product catalog.
//!
//! Order items arrive from the client as `{product_id, quantity}` pairs and
//! are re-priced against this catalog. Client-supplied prices are never
//! trusted.

use serde::{Deserialize, Serialize};

/// A product available in the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    /// Unique product identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price per unit in cents.
    pub price_cents: i64,
    /// Whether the product can currently be ordered.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// The set of products the service will sell.
///
/// Loaded from a JSON file when configured, otherwise a built-in default
/// catalog is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCatalog {
    /// All products, enabled or not.
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create a catalog from a list of products.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, std::io::Error> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Find a product that can currently be ordered.
    ///
    /// Returns `None` for unknown ids and for disabled products.
    #[must_use]
    pub fn find_enabled(&self, product_id: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id == product_id && p.enabled)
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new(vec![
            Product {
                id: "prod_starter_pack".into(),
                name: "Starter Template Pack".into(),
                price_cents: 400,
                enabled: true,
            },
            Product {
                id: "prod_icon_set".into(),
                name: "Icon Set".into(),
                price_cents: 200,
                enabled: true,
            },
            Product {
                id: "prod_ebook".into(),
                name: "Design Handbook (eBook)".into(),
                price_cents: 900,
                enabled: true,
            },
            Product {
                id: "prod_pro_bundle".into(),
                name: "Pro Asset Bundle".into(),
                price_cents: 2500,
                enabled: true,
            },
        ])
    }
}
