//! Account lifecycle handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use sellerglass_core::{AccountId, OrderId, OwnerId};

use crate::db;
use crate::db::accounts::CredentialUpdate;
use crate::error::AppError;
use crate::models::account::{AccountSummary, NewAccount};
use crate::models::listing::Listing;
use crate::models::order::{SalesOrder, SalesOrderItem};
use crate::models::transaction::FinancialTransaction;
use crate::services::accounts::ConnectOutcome;
use crate::state::AppState;

/// Build the account routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create).get(index))
        .route("/accounts/{id}", get(show).delete(remove))
        .route("/accounts/{id}/reconnect", post(reconnect))
        .route("/accounts/{id}/listings", get(listings))
        .route("/accounts/{id}/orders", get(orders))
        .route("/accounts/{id}/orders/{order_id}", get(order_detail))
        .route("/accounts/{id}/transactions", get(transactions))
}

/// Query filter for account listing.
#[derive(Debug, Deserialize)]
pub struct OwnerFilter {
    pub owner_id: OwnerId,
}

/// Response for account connect and reconnect.
#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub account: AccountSummary,
    /// Whether live verification succeeded and the account is `connected`.
    pub verified: bool,
    /// Why verification failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ConnectOutcome> for ConnectResponse {
    fn from(outcome: ConnectOutcome) -> Self {
        Self {
            account: outcome.account.into(),
            verified: outcome.verified,
            error: outcome.error,
        }
    }
}

/// Connect a new marketplace account.
///
/// The account is stored `pending` and verified once against the live API.
/// A failed verification is reported in the response body, not as an error;
/// the account stays `pending` for a later reconnect.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewAccount>,
) -> Result<(StatusCode, Json<ConnectResponse>), AppError> {
    let outcome = state.accounts().connect(input).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// List one owner's accounts.
async fn index(
    State(state): State<AppState>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<AccountSummary>>, AppError> {
    let accounts = db::accounts::list_accounts_by_owner(state.pool(), filter.owner_id).await?;
    Ok(Json(
        accounts.into_iter().map(AccountSummary::from).collect(),
    ))
}

/// Fetch a single account.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<Json<AccountSummary>, AppError> {
    let account = db::accounts::get_account(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("account {id}")))?;
    Ok(Json(account.into()))
}

/// Delete an account; listings, orders and transactions cascade.
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<StatusCode, AppError> {
    // A deleted account must not keep running on an ad hoc schedule.
    state.scheduler().unschedule_account(id);
    if state.accounts().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("account {id}")))
    }
}

/// Swap an account's credentials and re-verify them.
async fn reconnect(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
    Json(update): Json<CredentialUpdate>,
) -> Result<Json<ConnectResponse>, AppError> {
    let outcome = state.accounts().reconnect(id, update).await?;
    Ok(Json(outcome.into()))
}

/// Listings synced for this account, most recently synced first.
async fn listings(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = db::listings::list_listings_by_account(state.pool(), id).await?;
    Ok(Json(listings))
}

/// Orders ingested for this account, newest purchase first.
async fn orders(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<Json<Vec<SalesOrder>>, AppError> {
    let orders = db::orders::list_orders_by_account(state.pool(), id).await?;
    Ok(Json(orders))
}

/// An ingested order with its line items.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: SalesOrder,
    pub items: Vec<SalesOrderItem>,
}

/// One ingested order, with line items.
async fn order_detail(
    State(state): State<AppState>,
    Path((id, order_id)): Path<(AccountId, OrderId)>,
) -> Result<Json<OrderDetail>, AppError> {
    let order = db::orders::get_order(state.pool(), id, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
    let items = db::orders::list_order_items(state.pool(), order_id).await?;
    Ok(Json(OrderDetail { order, items }))
}

/// Ledger lines recorded for this account, most recently posted first.
async fn transactions(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<Json<Vec<FinancialTransaction>>, AppError> {
    let transactions = db::transactions::list_transactions_by_account(state.pool(), id).await?;
    Ok(Json(transactions))
}
