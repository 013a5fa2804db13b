//! Credit balance types for shopledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A user's store-credit balance.
///
/// Created lazily on first read or first credit, mutated only through ledger
/// operations, never deleted. The balance always equals the sum of the user's
/// transaction amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditBalance {
    /// The user this balance belongs to.
    pub user_id: UserId,

    /// Current balance in cents. Never negative.
    pub balance_cents: i64,

    /// ISO currency code, fixed per user.
    pub currency: String,

    /// When the balance was last mutated.
    pub last_updated: DateTime<Utc>,
}

impl CreditBalance {
    /// Currency assigned to newly created balances.
    pub const DEFAULT_CURRENCY: &'static str = "USD";

    /// Create a new zero balance.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            balance_cents: 0,
            currency: Self::DEFAULT_CURRENCY.to_string(),
            last_updated: Utc::now(),
        }
    }

    /// Check whether the balance covers a deduction.
    #[must_use]
    pub fn has_sufficient_credits(&self, amount_cents: i64) -> bool {
        self.balance_cents >= amount_cents
    }
}
