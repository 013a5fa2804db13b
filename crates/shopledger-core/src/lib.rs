//! Core types for the shopledger store-credit system.
//!
//! This crate provides the foundational types used throughout shopledger:
//!
//! - **Identifiers**: `UserId`, `TransactionId`, `OrderId`
//! - **Balances**: `CreditBalance`
//! - **Transactions**: `CreditTransaction`, `TransactionType`, `TransactionMetadata`
//! - **Orders**: `Order`, `OrderItem`, `OrderStatus`
//! - **Packages**: `CreditPackage`, `PackageCatalog`
//!
//! # Credit unit
//!
//! **1 credit = $0.01 (1 cent)**
//!
//! - User buys the $25 package → gets 2500 credits
//! - An order totaling $6.00 deducts 600 credits
//! - Stored as `i64` (integer cents) to avoid floating point precision issues

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod balance;
pub mod error;
pub mod ids;
pub mod order;
pub mod package;
pub mod transaction;

pub use balance::CreditBalance;
pub use error::LedgerError;
pub use ids::{IdError, OrderId, TransactionId, UserId};
pub use order::{Order, OrderItem, OrderStatus, PaymentMethod};
pub use package::{CreditPackage, PackageCatalog};
pub use transaction::{CreditTransaction, TransactionMetadata, TransactionType};
