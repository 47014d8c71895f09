//! Manual sync trigger handlers.
//!
//! Each trigger runs its pass inline and returns the pass summary; these are
//! the same code paths the recurring scheduler drives on a cadence, so a
//! manual run and a scheduled run are indistinguishable to the rest of the
//! system. Accounts can additionally carry an ad hoc recurring schedule,
//! registered and cancelled here.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{post, put},
};
use serde::Deserialize;
use tracing::instrument;

use sellerglass_core::{AccountId, ConnectionStatus, OwnerId};

use crate::db;
use crate::error::AppError;
use crate::services::{
    AccountSyncOutcome, CatalogSyncSummary, FinanceSyncSummary, OrderSyncSummary, SyncError,
    SyncSelection,
};
use crate::state::AppState;

/// Build the sync trigger router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts/{id}/sync/products", post(products))
        .route("/accounts/{id}/sync/orders", post(orders))
        .route("/accounts/{id}/sync/finances", post(finances))
        .route("/accounts/{id}/sync/all", post(all))
        .route(
            "/accounts/{id}/sync/schedule",
            put(set_schedule).delete(remove_schedule),
        )
}

/// Optional ownership assertion for a product sync.
#[derive(Debug, Deserialize)]
pub struct ProductSyncParams {
    /// When set, the account must belong to this owner.
    #[serde(default)]
    pub owner_id: Option<OwnerId>,
}

/// Reconcile remote inventory into the catalog.
#[instrument(skip(state))]
async fn products(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Query(params): Query<ProductSyncParams>,
) -> Result<Json<CatalogSyncSummary>, AppError> {
    let owner_id = match params.owner_id {
        Some(owner_id) => owner_id,
        // No assertion from the caller: the account's own owner passes.
        None => {
            db::accounts::get_account(state.pool(), account_id)
                .await?
                .ok_or(SyncError::AccountNotFound(account_id))?
                .owner_id
        }
    };

    let summary = state.syncer().sync_products(account_id, owner_id).await?;
    Ok(Json(summary))
}

/// Ingest recent settled orders.
#[instrument(skip(state))]
async fn orders(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<OrderSyncSummary>, AppError> {
    let summary = state.syncer().sync_orders(account_id).await?;
    Ok(Json(summary))
}

/// Ingest and classify recent financial events.
#[instrument(skip(state))]
async fn finances(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<FinanceSyncSummary>, AppError> {
    let summary = state.syncer().sync_finances(account_id).await?;
    Ok(Json(summary))
}

/// Run every pass concurrently, like a scheduled full cycle would.
#[instrument(skip(state))]
async fn all(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<AccountSyncOutcome>, AppError> {
    let outcome = state.syncer().sync_all(account_id).await?;
    Ok(Json(outcome))
}

/// Which recurring selection an ad hoc schedule runs.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Orders + finances.
    Frequent,
    /// Products + orders + finances.
    #[default]
    Full,
    /// Full, with catalog re-enrichment.
    Refresh,
}

impl ScheduleMode {
    const fn selection(self) -> SyncSelection {
        match self {
            Self::Frequent => SyncSelection::FREQUENT,
            Self::Full => SyncSelection::FULL,
            Self::Refresh => SyncSelection::REFRESH,
        }
    }
}

/// Ad hoc schedule registration payload.
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    /// Interval between runs, in seconds.
    pub every_secs: u64,
    #[serde(default)]
    pub mode: ScheduleMode,
}

/// Register (or replace) an independent recurring schedule for one account.
#[instrument(skip(state))]
async fn set_schedule(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Json(request): Json<ScheduleRequest>,
) -> Result<StatusCode, AppError> {
    if request.every_secs == 0 {
        return Err(AppError::BadRequest(
            "every_secs must be greater than zero".to_string(),
        ));
    }

    let account = db::accounts::get_account(state.pool(), account_id)
        .await?
        .ok_or(SyncError::AccountNotFound(account_id))?;
    if account.status == ConnectionStatus::Disconnected {
        return Err(SyncError::AccountDisconnected(account_id).into());
    }

    state.scheduler().schedule_account(
        account_id,
        Duration::from_secs(request.every_secs),
        request.mode.selection(),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Cancel an account's ad hoc schedule.
#[instrument(skip(state))]
async fn remove_schedule(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> StatusCode {
    if state.scheduler().unschedule_account(account_id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_mode_maps_to_selection() {
        assert_eq!(ScheduleMode::Frequent.selection(), SyncSelection::FREQUENT);
        assert_eq!(ScheduleMode::Full.selection(), SyncSelection::FULL);
        assert_eq!(ScheduleMode::Refresh.selection(), SyncSelection::REFRESH);
    }

    #[test]
    fn test_schedule_request_defaults_to_full() {
        let request: ScheduleRequest =
            serde_json::from_str(r#"{"every_secs": 900}"#).expect("schedule json");
        assert_eq!(request.every_secs, 900);
        assert!(matches!(request.mode, ScheduleMode::Full));
    }
}
