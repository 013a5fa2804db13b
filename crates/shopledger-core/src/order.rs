//! Order types for shopledger.
//!
//! An order is a cart of catalog items settled against the credit balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::{OrderId, UserId};

/// A single line item in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The catalog product id.
    pub product_id: String,

    /// Product name at the time of purchase.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Unit price in cents at the time of purchase.
    pub price_per_unit_cents: i64,

    /// Line total: `quantity * price_per_unit_cents`.
    pub total_cents: i64,
}

impl OrderItem {
    /// Create a line item, computing the line total.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAmount` if `quantity * price_per_unit_cents`
    /// overflows `i64`.
    pub fn new(
        product_id: String,
        product_name: String,
        quantity: u32,
        price_per_unit_cents: i64,
    ) -> Result<Self, LedgerError> {
        let total_cents = i64::from(quantity)
            .checked_mul(price_per_unit_cents)
            .ok_or_else(|| {
                LedgerError::InvalidAmount(format!(
                    "line total overflows: {quantity} x {price_per_unit_cents}"
                ))
            })?;

        Ok(Self {
            product_id,
            product_name,
            quantity,
            price_per_unit_cents,
            total_cents,
        })
    }
}

/// How an order was paid. Credits are the only rail this service settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid from the store-credit balance.
    Credits,
}

/// Status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, not yet settled.
    Pending,

    /// Settled from credits.
    Completed,

    /// Cancelled before settlement.
    Cancelled,

    /// Refunded after settlement failed to stick.
    Refunded,
}

impl OrderStatus {
    /// Check whether a transition to `next` is legal.
    ///
    /// Orders only ever leave `Pending`; every other status is terminal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::Completed | Self::Cancelled | Self::Refunded
            )
        )
    }
}

/// An order paid from store credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID (ULID for time-ordering).
    pub id: OrderId,

    /// The user who placed the order.
    pub user_id: UserId,

    /// Line items.
    pub items: Vec<OrderItem>,

    /// Order total: sum of line totals, in cents.
    pub total_cents: i64,

    /// Payment rail used.
    pub payment_method: PaymentMethod,

    /// Current status.
    pub status: OrderStatus,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// When the order completed, if it has.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a new pending order, computing the total from its items.
    #[must_use]
    pub fn new(user_id: UserId, items: Vec<OrderItem>) -> Self {
        let total_cents = items.iter().map(|item| item.total_cents).sum();
        Self {
            id: OrderId::generate(),
            user_id,
            items,
            total_cents,
            payment_method: PaymentMethod::Credits,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Transition the order to `Completed`, stamping `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidStatusTransition` if the order is not pending.
    pub fn complete(&mut self) -> Result<(), LedgerError> {
        self.transition(OrderStatus::Completed)?;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Transition the order to `Cancelled`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidStatusTransition` if the order is not pending.
    pub fn cancel(&mut self) -> Result<(), LedgerError> {
        self.transition(OrderStatus::Cancelled)
    }

    fn transition(&mut self, next: OrderStatus) -> Result<(), LedgerError> {
        if !self.status.can_transition_to(next) {
            return Err(LedgerError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
