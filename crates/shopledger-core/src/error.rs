//! Error types for shopledger.
//!
//! Storage and HTTP failures live in the store and service crates; this
//! taxonomy covers only the domain rules the core types enforce themselves.

use crate::order::OrderStatus;

/// Errors that can occur in ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A ledger value was given a non-positive or overflowing amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Purchase references a package that does not exist.
    #[error("unknown credit package: {package_id}")]
    UnknownPackage {
        /// The requested package id.
        package_id: String,
    },

    /// Purchase references a package that is not currently for sale.
    #[error("credit package is disabled: {package_id}")]
    PackageDisabled {
        /// The requested package id.
        package_id: String,
    },

    /// An order was asked to make an illegal status transition.
    #[error("invalid order status transition from {from:?} to {to:?}")]
    InvalidStatusTransition {
        /// The current status.
        from: OrderStatus,
        /// The requested status.
        to: OrderStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_package() {
        let err = LedgerError::UnknownPackage {
            package_id: "pkg_404".into(),
        };
        assert_eq!(err.to_string(), "unknown credit package: pkg_404");

        let err = LedgerError::PackageDisabled {
            package_id: "pkg_10".into(),
        };
        assert_eq!(err.to_string(), "credit package is disabled: pkg_10");
    }

    #[test]
    fn transition_message_names_both_states() {
        let err = LedgerError::InvalidStatusTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Cancelled,
        };
        assert!(err.to_string().contains("Completed"));
        assert!(err.to_string().contains("Cancelled"));
    }
}
