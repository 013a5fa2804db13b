//! API handlers.

// Allow precision loss in handlers - amounts displayed are well within f64 precision
#![allow(clippy::cast_precision_loss)]

pub mod credits;
pub mod health;
pub mod orders;
pub mod webhooks;
