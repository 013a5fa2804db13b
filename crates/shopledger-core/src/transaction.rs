//! Credit transaction types for shopledger.
//!
//! Every balance change creates an immutable transaction record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::balance::CreditBalance;
use crate::order::OrderItem;
use crate::{OrderId, TransactionId, UserId};

/// A credit transaction representing a single balance change.
///
/// Transactions are append-only: once written they are never mutated or
/// deleted. `balance_after_cents` is the balance snapshot taken atomically
/// with this transaction's application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// Type of transaction.
    pub transaction_type: TransactionType,

    /// Amount in cents. Positive = credit, negative = debit.
    pub amount_cents: i64,

    /// Balance after this transaction (in cents).
    pub balance_after_cents: i64,

    /// ISO currency code.
    pub currency: String,

    /// Human-readable description.
    pub description: String,

    /// Structured metadata tied to the transaction kind.
    pub metadata: TransactionMetadata,

    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    /// Create a new purchase transaction (credits bought via the payment platform).
    #[must_use]
    pub fn purchase(
        user_id: UserId,
        amount_cents: i64,
        balance_after_cents: i64,
        description: String,
        metadata: TransactionMetadata,
    ) -> Self {
        Self::build(
            user_id,
            TransactionType::Purchase,
            amount_cents,
            balance_after_cents,
            description,
            metadata,
        )
    }

    /// Create a new debit transaction. The amount is always stored negative.
    #[must_use]
    pub fn debit(
        user_id: UserId,
        amount_cents: i64,
        balance_after_cents: i64,
        description: String,
        metadata: TransactionMetadata,
    ) -> Self {
        Self::build(
            user_id,
            TransactionType::Debit,
            -amount_cents.abs(),
            balance_after_cents,
            description,
            metadata,
        )
    }

    /// Create a new refund transaction.
    #[must_use]
    pub fn refund(
        user_id: UserId,
        amount_cents: i64,
        balance_after_cents: i64,
        description: String,
        metadata: TransactionMetadata,
    ) -> Self {
        Self::build(
            user_id,
            TransactionType::Refund,
            amount_cents,
            balance_after_cents,
            description,
            metadata,
        )
    }

    /// Create a new admin adjustment transaction.
    #[must_use]
    pub fn adjustment(
        user_id: UserId,
        amount_cents: i64,
        balance_after_cents: i64,
        description: String,
        metadata: TransactionMetadata,
    ) -> Self {
        Self::build(
            user_id,
            TransactionType::AdminAdjustment,
            amount_cents,
            balance_after_cents,
            description,
            metadata,
        )
    }

    fn build(
        user_id: UserId,
        transaction_type: TransactionType,
        amount_cents: i64,
        balance_after_cents: i64,
        description: String,
        metadata: TransactionMetadata,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            transaction_type,
            amount_cents,
            balance_after_cents,
            currency: CreditBalance::DEFAULT_CURRENCY.to_string(),
            description,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// Type of credit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Credits purchased through the payment platform.
    Purchase,

    /// Credits spent on an order.
    Debit,

    /// Credits returned for a refunded order.
    Refund,

    /// Manual adjustment by an operator.
    AdminAdjustment,
}

impl TransactionType {
    /// Check if this transaction type adds credits.
    #[must_use]
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::Purchase | Self::Refund | Self::AdminAdjustment)
    }

    /// Check if this transaction type removes credits.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::Debit)
    }
}

/// Structured metadata attached to a transaction.
///
/// Modeled as a tagged enum rather than an open map so missing fields are a
/// deserialization error instead of a silent `None` at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionMetadata {
    /// No additional context.
    None,

    /// A credit purchase settled by the payment platform.
    CreditPurchase {
        /// The credit package that was bought.
        package_id: String,
        /// External payment id (dedup key).
        payment_id: String,
        /// External checkout session id, when the platform reports one.
        session_id: Option<String>,
        /// Base credits in the package.
        credit_cents: i64,
        /// Bonus credits granted on top.
        bonus_cents: i64,
    },

    /// An order paid from credits.
    OrderPayment {
        /// The order this debit settled.
        order_id: OrderId,
        /// The items that were purchased.
        items: Vec<OrderItem>,
    },

    /// A manual operator adjustment.
    Adjustment {
        /// Why the adjustment was made.
        reason: String,
        /// Who made it (service name or operator handle).
        actor: String,
    },
}
