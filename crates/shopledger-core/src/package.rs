//! Credit purchase packages.
//!
//! Packages are static catalog configuration, not user data. Each one maps to
//! a plan on the payment platform.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A purchasable bundle of store credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPackage {
    /// Package identifier (e.g. `pkg_25`).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Base credits granted, in cents.
    pub amount_cents: i64,

    /// Price charged, in cents.
    pub price_cents: i64,

    /// Bonus credits granted on top of the base amount, in cents.
    #[serde(default)]
    pub bonus_cents: i64,

    /// Marketing copy.
    #[serde(default)]
    pub description: String,

    /// Plan id on the payment platform used for checkout.
    pub plan_id: String,

    /// Highlight this package in the storefront.
    #[serde(default)]
    pub popular: bool,

    /// Whether the package can currently be purchased.
    pub enabled: bool,
}

impl CreditPackage {
    /// Total credits granted on purchase (base + bonus), in cents.
    #[must_use]
    pub fn total_credit_cents(&self) -> i64 {
        self.amount_cents + self.bonus_cents
    }
}

/// The set of packages offered by the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageCatalog {
    packages: Vec<CreditPackage>,
}

impl PackageCatalog {
    /// Create a catalog from an explicit package list.
    #[must_use]
    pub fn new(packages: Vec<CreditPackage>) -> Self {
        Self { packages }
    }

    /// The packages that can currently be purchased.
    #[must_use]
    pub fn enabled(&self) -> Vec<&CreditPackage> {
        self.packages.iter().filter(|pkg| pkg.enabled).collect()
    }

    /// Look up a package by id, whether or not it is enabled.
    ///
    /// Used when resolving payments for packages that may have been retired
    /// after the checkout session was created.
    #[must_use]
    pub fn find(&self, package_id: &str) -> Option<&CreditPackage> {
        self.packages.iter().find(|pkg| pkg.id == package_id)
    }

    /// Look up a package by id, rejecting unknown or disabled packages.
    ///
    /// # Errors
    ///
    /// - `LedgerError::UnknownPackage` if no package has this id.
    /// - `LedgerError::PackageDisabled` if the package exists but is disabled.
    pub fn find_enabled(&self, package_id: &str) -> Result<&CreditPackage, LedgerError> {
        let package = self
            .packages
            .iter()
            .find(|pkg| pkg.id == package_id)
            .ok_or_else(|| LedgerError::UnknownPackage {
                package_id: package_id.to_string(),
            })?;

        if !package.enabled {
            return Err(LedgerError::PackageDisabled {
                package_id: package_id.to_string(),
            });
        }

        Ok(package)
    }
}

impl Default for PackageCatalog {
    /// The storefront's standard four tiers: flat $10/$25, then 10% and 20%
    /// bonus tiers at $50 and $100.
    fn default() -> Self {
        Self::new(vec![
            CreditPackage {
                id: "pkg_10".into(),
                name: "$10 Credits".into(),
                amount_cents: 1000,
                price_cents: 1000,
                bonus_cents: 0,
                description: "Perfect for getting started".into(),
                plan_id: "plan_credits_10".into(),
                popular: false,
                enabled: true,
            },
            CreditPackage {
                id: "pkg_25".into(),
                name: "$25 Credits".into(),
                amount_cents: 2500,
                price_cents: 2500,
                bonus_cents: 0,
                description: "Popular choice for regular shoppers".into(),
                plan_id: "plan_credits_25".into(),
                popular: true,
                enabled: true,
            },
            CreditPackage {
                id: "pkg_50".into(),
                name: "$50 Credits".into(),
                amount_cents: 5000,
                price_cents: 5000,
                bonus_cents: 500,
                description: "Great value - get 10% bonus!".into(),
                plan_id: "plan_credits_50".into(),
                popular: false,
                enabled: true,
            },
            CreditPackage {
                id: "pkg_100".into(),
                name: "$100 Credits".into(),
                amount_cents: 10000,
                price_cents: 10000,
                bonus_cents: 2000,
                description: "Best value - get 20% bonus!".into(),
                plan_id: "plan_credits_100".into(),
                popular: false,
                enabled: true,
            },
        ])
    }
}
