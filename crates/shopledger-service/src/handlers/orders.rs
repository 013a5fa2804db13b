//! Order settlement and history handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use shopledger_core::{Order, OrderItem, OrderStatus, PaymentMethod};
use shopledger_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// An item in an order creation request.
///
/// Only the product id and quantity come from the client; prices are
/// resolved from the trusted catalog.
#[derive(Debug, Deserialize)]
pub struct CreateOrderItem {
    /// Product to purchase.
    pub product_id: String,
    /// Number of units.
    pub quantity: u32,
}

/// Order creation request.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Items to purchase.
    pub items: Vec<CreateOrderItem>,
}

/// An item in an order response.
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    /// Product id.
    pub product_id: String,
    /// Product name at time of purchase.
    pub product_name: String,
    /// Number of units.
    pub quantity: u32,
    /// Unit price in cents.
    pub price_per_unit_cents: i64,
    /// Line total in cents.
    pub total_cents: i64,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price_per_unit_cents: item.price_per_unit_cents,
            total_cents: item.total_cents,
        }
    }
}

/// Order response.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order id.
    pub id: String,
    /// Items in the order.
    pub items: Vec<OrderItemResponse>,
    /// Order total in cents.
    pub total_cents: i64,
    /// How the order was paid.
    pub payment_method: PaymentMethod,
    /// Order status.
    pub status: OrderStatus,
    /// When the order was created.
    pub created_at: String,
    /// When the order completed, if it has.
    pub completed_at: Option<String>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            items: order.items.iter().map(OrderItemResponse::from).collect(),
            total_cents: order.total_cents,
            payment_method: order.payment_method,
            status: order.status,
            created_at: order.created_at.to_rfc3339(),
            completed_at: order.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Order creation response.
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    /// The settled order.
    pub order: OrderResponse,
    /// The debit transaction recorded for the order.
    pub transaction_id: String,
    /// Balance after settlement.
    pub balance_cents: i64,
}

/// Settle an order from credits.
///
/// Items are re-priced against the trusted product catalog; the funds check,
/// debit, and order persistence happen as one atomic store operation.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    if body.items.is_empty() {
        return Err(ApiError::BadRequest("order has no items".into()));
    }

    let mut items = Vec::with_capacity(body.items.len());
    for item in &body.items {
        if item.quantity == 0 {
            return Err(ApiError::BadRequest(format!(
                "quantity must be at least 1 for product: {}",
                item.product_id
            )));
        }

        let product = state.products.find_enabled(&item.product_id).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "unknown or unavailable product: {}",
                item.product_id
            ))
        })?;

        let line = OrderItem::new(
            product.id.clone(),
            product.name.clone(),
            item.quantity,
            product.price_cents,
        )
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        items.push(line);
    }

    let (order, tx) = state.store.settle_order(&auth.user_id, items)?;

    tracing::info!(
        user_id = %auth.user_id,
        order_id = %order.id,
        total_cents = %order.total_cents,
        balance_after = %tx.balance_after_cents,
        "Order settled from credits"
    );

    Ok(Json(CreateOrderResponse {
        order: OrderResponse::from(&order),
        transaction_id: tx.id.to_string(),
        balance_cents: tx.balance_after_cents,
    }))
}

/// Order list response.
#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    /// Orders, newest first.
    pub orders: Vec<OrderResponse>,
}

/// List the authenticated user's orders, newest first.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ListOrdersResponse>, ApiError> {
    let orders = state.store.list_orders_by_user(&auth.user_id)?;

    Ok(Json(ListOrdersResponse {
        orders: orders.iter().map(OrderResponse::from).collect(),
    }))
}

/// Get one of the authenticated user's orders.
///
/// Orders belonging to other users are indistinguishable from missing ones.
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = order_id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("order not found: {order_id}")))?;

    let order = state
        .store
        .get_order(&order_id)?
        .filter(|order| order.user_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("order not found: {order_id}")))?;

    Ok(Json(OrderResponse::from(&order)))
}
