//! Credit balance, transaction, package, and purchase handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use shopledger_core::{
    CreditPackage, CreditTransaction, LedgerError, TransactionMetadata, TransactionType, UserId,
};
use shopledger_store::Store;

use crate::auth::{AuthUser, ServiceAuth};
use crate::checkout::CheckoutMetadata;
use crate::error::ApiError;
use crate::state::AppState;

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Balance in cents (1 credit = 1 cent).
    pub balance_cents: i64,
    /// Balance formatted as dollars.
    pub balance_formatted: String,
    /// Balance currency.
    pub currency: String,
    /// When the balance last changed.
    pub last_updated: String,
}

/// Get current credit balance.
///
/// A balance record is created lazily on first read, so every authenticated
/// user has a balance.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.store.get_or_create_balance(&auth.user_id)?;

    Ok(Json(BalanceResponse {
        balance_cents: balance.balance_cents,
        balance_formatted: format!("${:.2}", balance.balance_cents as f64 / 100.0),
        currency: balance.currency,
        last_updated: balance.last_updated.to_rfc3339(),
    }))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Transaction response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Amount in cents (positive = credit, negative = debit).
    pub amount_cents: i64,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Balance after this transaction.
    pub balance_after_cents: i64,
    /// Description.
    pub description: String,
    /// Structured origin of the transaction.
    pub metadata: TransactionMetadata,
    /// Timestamp.
    pub created_at: String,
}

impl From<&CreditTransaction> for TransactionResponse {
    fn from(tx: &CreditTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            amount_cents: tx.amount_cents,
            transaction_type: tx.transaction_type,
            balance_after_cents: tx.balance_after_cents,
            description: tx.description.clone(),
            metadata: tx.metadata.clone(),
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// List transaction history, newest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let transactions =
        state
            .store
            .list_transactions_by_user(&auth.user_id, limit + 1, query.offset)?;

    let has_more = transactions.len() > limit;
    let transactions: Vec<_> = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        has_more,
    }))
}

/// Credit package response.
#[derive(Debug, Serialize)]
pub struct PackageResponse {
    /// Package ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Base credits in cents.
    pub amount_cents: i64,
    /// Bonus credits in cents.
    pub bonus_cents: i64,
    /// Total credits issued on purchase.
    pub total_credit_cents: i64,
    /// Purchase price in cents.
    pub price_cents: i64,
    /// Marketing description.
    pub description: String,
    /// Whether the package is highlighted in the UI.
    pub popular: bool,
}

impl From<&CreditPackage> for PackageResponse {
    fn from(pkg: &CreditPackage) -> Self {
        Self {
            id: pkg.id.clone(),
            name: pkg.name.clone(),
            amount_cents: pkg.amount_cents,
            bonus_cents: pkg.bonus_cents,
            total_credit_cents: pkg.total_credit_cents(),
            price_cents: pkg.price_cents,
            description: pkg.description.clone(),
            popular: pkg.popular,
        }
    }
}

/// List packages response.
#[derive(Debug, Serialize)]
pub struct ListPackagesResponse {
    /// Enabled packages.
    pub packages: Vec<PackageResponse>,
}

/// List the credit packages available for purchase.
pub async fn list_packages(State(state): State<Arc<AppState>>) -> Json<ListPackagesResponse> {
    let packages = state
        .packages
        .enabled()
        .into_iter()
        .map(PackageResponse::from)
        .collect();

    Json(ListPackagesResponse { packages })
}

/// Purchase credits request.
#[derive(Debug, Deserialize)]
pub struct PurchaseCreditsRequest {
    /// The credit package to purchase.
    pub package_id: String,
}

/// Purchase credits response.
#[derive(Debug, Serialize)]
pub struct PurchaseCreditsResponse {
    /// Hosted checkout page URL on the payment platform.
    pub checkout_url: String,
    /// Session ID for tracking.
    pub session_id: String,
    /// The package being purchased.
    pub package: PackageResponse,
}

/// Initiate a credit package purchase via the payment platform.
///
/// Creates a checkout session carrying typed `credit_purchase` metadata; the
/// actual credit issuance happens when the platform confirms the payment via
/// webhook.
pub async fn purchase_credits(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<PurchaseCreditsRequest>,
) -> Result<Json<PurchaseCreditsResponse>, ApiError> {
    let package = state.packages.find_enabled(&body.package_id).map_err(|e| match e {
        LedgerError::UnknownPackage { package_id } => {
            ApiError::NotFound(format!("unknown credit package: {package_id}"))
        }
        LedgerError::PackageDisabled { package_id } => {
            ApiError::BadRequest(format!("credit package is not available: {package_id}"))
        }
        other => ApiError::Internal(other.to_string()),
    })?;

    // Verify the payment platform is configured
    let checkout = state
        .checkout
        .as_ref()
        .ok_or_else(|| ApiError::ExternalService("Checkout not configured".into()))?;

    let metadata = CheckoutMetadata {
        purchase_type: CheckoutMetadata::CREDIT_PURCHASE.into(),
        package_id: package.id.clone(),
        user_email: auth.user_id.to_string(),
        credit_cents: package.amount_cents,
        bonus_cents: package.bonus_cents,
    };

    let redirect_url = format!("{}/credits/purchase-complete", state.config.frontend_url);

    tracing::info!(
        user_id = %auth.user_id,
        package_id = %package.id,
        price_cents = %package.price_cents,
        total_credit_cents = %package.total_credit_cents(),
        "Initiating credit purchase"
    );

    let session = checkout
        .create_checkout_session(&package.plan_id, &redirect_url, &metadata)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create checkout session");
            ApiError::ExternalService(format!("Failed to create checkout session: {e}"))
        })?;

    tracing::info!(
        user_id = %auth.user_id,
        session_id = %session.id,
        "Checkout session created"
    );

    Ok(Json(PurchaseCreditsResponse {
        checkout_url: checkout.checkout_url(&session.id),
        session_id: session.id,
        package: PackageResponse::from(package),
    }))
}

/// Admin credit adjustment request (bonus/promo/correction).
#[derive(Debug, Deserialize)]
pub struct AdjustCreditsRequest {
    /// User email to grant credits to.
    pub user_email: String,
    /// Amount in cents (must be positive).
    pub amount_cents: i64,
    /// Reason for the adjustment.
    pub reason: String,
}

/// Admin credit adjustment response.
#[derive(Debug, Serialize)]
pub struct AdjustCreditsResponse {
    /// Balance after the adjustment.
    pub balance_cents: i64,
    /// The recorded transaction.
    pub transaction_id: String,
}

/// Service-authenticated endpoint to grant credits.
pub async fn adjust_credits(
    State(state): State<Arc<AppState>>,
    service: ServiceAuth,
    Json(body): Json<AdjustCreditsRequest>,
) -> Result<Json<AdjustCreditsResponse>, ApiError> {
    let user_id = UserId::new(&body.user_email)
        .map_err(|e| ApiError::BadRequest(format!("invalid user email: {e}")))?;

    let tx = state.store.credit(
        &user_id,
        body.amount_cents,
        TransactionType::AdminAdjustment,
        body.reason.clone(),
        TransactionMetadata::Adjustment {
            reason: body.reason.clone(),
            actor: service.service_name.clone(),
        },
    )?;

    tracing::info!(
        user_id = %user_id,
        amount_cents = %body.amount_cents,
        reason = %body.reason,
        actor = %service.service_name,
        new_balance = %tx.balance_after_cents,
        "Credits adjusted"
    );

    Ok(Json(AdjustCreditsResponse {
        balance_cents: tx.balance_after_cents,
        transaction_id: tx.id.to_string(),
    }))
}
