//! Column family layout for the shopledger database.

/// Column family names.
pub mod cf {
    /// Balance records, keyed by user id.
    pub const BALANCES: &str = "balances";

    /// Credit transactions, keyed by transaction id (ULID).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index for listing a user's transactions in time order.
    pub const TRANSACTIONS_BY_USER: &str = "transactions_by_user";

    /// Orders, keyed by order id (ULID).
    pub const ORDERS: &str = "orders";

    /// Index for listing a user's orders in time order.
    pub const ORDERS_BY_USER: &str = "orders_by_user";

    /// Processed payment events, keyed by external payment id (idempotency).
    pub const PAYMENT_EVENTS: &str = "payment_events";
}

/// All column families that must exist in the database.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::BALANCES,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_USER,
        cf::ORDERS,
        cf::ORDERS_BY_USER,
        cf::PAYMENT_EVENTS,
    ]
}
