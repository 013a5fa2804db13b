//! `RocksDB` storage and ledger operations for shopledger.
//!
//! This crate owns the three durable collections — balances, transactions,
//! orders — plus a payment-event set used to deduplicate webhook credits.
//!
//! # Architecture
//!
//! Column families:
//!
//! - `balances`: balance records, keyed by user id
//! - `transactions`: credit transactions, keyed by transaction id (ULID)
//! - `transactions_by_user`: index for listing transactions by user
//! - `orders` / `orders_by_user`: order records and their per-user index
//! - `payment_events`: processed external payment ids (idempotency)
//!
//! # Consistency
//!
//! The ledger operations (`credit`, `debit`, `settle_order`, ...) are the
//! only mutation surface for balances. Each one serializes against other
//! operations on the same user via a per-user mutex, and persists its full
//! effect in a single `WriteBatch`, so `balance_after_cents` snapshots are
//! exact and a half-applied operation can never hit disk.
//!
//! # Example
//!
//! ```no_run
//! use shopledger_store::{RocksStore, Store};
//! use shopledger_core::{TransactionMetadata, TransactionType, UserId};
//!
//! let store = RocksStore::open("/tmp/shopledger-db").unwrap();
//! let user = UserId::new("a@x.com").unwrap();
//!
//! let tx = store
//!     .credit(
//!         &user,
//!         1000,
//!         TransactionType::Purchase,
//!         "top-up".into(),
//!         TransactionMetadata::None,
//!     )
//!     .unwrap();
//! assert_eq!(tx.balance_after_cents, 1000);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod locks;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use shopledger_core::{
    CreditBalance, CreditTransaction, Order, OrderId, OrderItem, TransactionId,
    TransactionMetadata, TransactionType, UserId,
};

/// The storage trait defining all database and ledger operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g. `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Balance Operations
    // =========================================================================

    /// Get a balance record by user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_balance(&self, user_id: &UserId) -> Result<Option<CreditBalance>>;

    /// Get the balance for a user, creating a zero balance if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error only if the database operation fails.
    fn get_or_create_balance(&self, user_id: &UserId) -> Result<CreditBalance>;

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    /// Get a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<CreditTransaction>>;

    /// List transactions for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>>;

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Increase a user's balance, creating the balance record if absent.
    ///
    /// `transaction_type` must be a crediting type (`Purchase`, `Refund`,
    /// or `AdminAdjustment`).
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidAmount` if `amount_cents <= 0` or the type debits.
    fn credit(
        &self,
        user_id: &UserId,
        amount_cents: i64,
        transaction_type: TransactionType,
        description: String,
        metadata: TransactionMetadata,
    ) -> Result<CreditTransaction>;

    /// Credit a user from an external payment event, exactly once.
    ///
    /// The payment id is recorded in the same write batch as the credit;
    /// a redelivered event fails the dedup check.
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicatePayment` if this payment id was already credited.
    /// - `StoreError::InvalidAmount` if `amount_cents <= 0`.
    fn credit_from_payment(
        &self,
        payment_id: &str,
        user_id: &UserId,
        amount_cents: i64,
        description: String,
        metadata: TransactionMetadata,
    ) -> Result<CreditTransaction>;

    /// Decrease a user's balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user has no balance record (distinct
    ///   from a zero balance).
    /// - `StoreError::InsufficientCredits` if the balance is too low.
    /// - `StoreError::InvalidAmount` if `amount_cents <= 0`.
    fn debit(
        &self,
        user_id: &UserId,
        amount_cents: i64,
        description: String,
        metadata: TransactionMetadata,
    ) -> Result<CreditTransaction>;

    // =========================================================================
    // Order Operations
    // =========================================================================

    /// Settle an order from credits: funds check, debit, and completion as
    /// one atomic operation. Nothing is persisted on failure, so a failed
    /// settlement can never leave an orphaned pending order.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user has no balance record.
    /// - `StoreError::InsufficientCredits` if the balance is too low.
    /// - `StoreError::InvalidAmount` if the order is empty or totals zero.
    fn settle_order(
        &self,
        user_id: &UserId,
        items: Vec<OrderItem>,
    ) -> Result<(Order, CreditTransaction)>;

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// List orders for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>>;

    // =========================================================================
    // Payment Event Operations (idempotency)
    // =========================================================================

    /// Check whether an external payment id has already been credited.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn has_payment_event(&self, payment_id: &str) -> Result<bool>;
}
