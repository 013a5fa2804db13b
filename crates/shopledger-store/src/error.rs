//! Error types for shopledger storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was missing.
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// Insufficient credits for a debit.
    #[error("insufficient credits: required={required}, available={available}")]
    InsufficientCredits {
        /// Amount the operation needed, in cents.
        required: i64,
        /// Balance available, in cents.
        available: i64,
    },

    /// A ledger mutation was given an unusable amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A payment event was already credited (idempotency check failed).
    #[error("duplicate payment: {payment_id}")]
    DuplicatePayment {
        /// The external payment id that was already processed.
        payment_id: String,
    },

    /// An order was asked to make an illegal status transition.
    #[error("invalid order transition: {0}")]
    InvalidTransition(String),
}
