//! Recurring sync cycles across all sync-eligible accounts.
//!
//! Three cadences run as plain `tokio::time::interval` loops: frequent
//! (orders + finances), full (everything), and refresh (everything plus
//! catalog re-enrichment). Each cycle fans out over the eligible accounts
//! concurrently and settles every account before reporting; one account
//! failing never touches another. Cadences can land on the same tick -
//! ingestion is idempotent, so overlapping runs are safe.
//!
//! On top of the fixed cadences, individual accounts can carry an ad hoc
//! schedule: an independent, cancellable interval task running a chosen
//! selection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use sellerglass_core::AccountId;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::SyncConfig;
use crate::db;

use super::SyncError;
use super::sync::{SyncSelection, SyncService};

/// Tally of one cycle over the eligible accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleReport {
    pub accounts: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Drives the recurring cadences and the ad hoc per-account schedules.
///
/// Cheap to clone; all clones share the same ad hoc task registry.
#[derive(Clone)]
pub struct SyncScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    pool: PgPool,
    syncer: SyncService,
    config: SyncConfig,
    ad_hoc: Mutex<HashMap<AccountId, JoinHandle<()>>>,
}

impl SyncScheduler {
    #[must_use]
    pub fn new(pool: PgPool, syncer: SyncService, config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                pool,
                syncer,
                config,
                ad_hoc: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Spawn the three recurring cadence loops onto the runtime.
    pub fn spawn_recurring(&self) {
        let config = self.inner.config;
        self.spawn_cadence("frequent", config.frequent_interval, SyncSelection::FREQUENT);
        self.spawn_cadence("full", config.full_interval, SyncSelection::FULL);
        self.spawn_cadence("refresh", config.refresh_interval, SyncSelection::REFRESH);

        tracing::info!(
            frequent_secs = config.frequent_interval.as_secs(),
            full_secs = config.full_interval.as_secs(),
            refresh_secs = config.refresh_interval.as_secs(),
            "recurring sync scheduler started"
        );
    }

    fn spawn_cadence(&self, cadence: &'static str, period: Duration, selection: SyncSelection) {
        let scheduler = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // An interval's first tick completes immediately; consume it so
            // the first cycle runs one full period after boot
            ticker.tick().await;

            loop {
                ticker.tick().await;
                tracing::info!(cadence, "starting scheduled sync cycle");
                match scheduler.run_cycle(selection).await {
                    Ok(report) => tracing::info!(
                        cadence,
                        accounts = report.accounts,
                        succeeded = report.succeeded,
                        failed = report.failed,
                        "sync cycle finished"
                    ),
                    Err(error) => tracing::error!(cadence, %error, "sync cycle aborted"),
                }
            }
        });
    }

    /// Run one cycle over every sync-eligible account.
    ///
    /// Accounts are synced concurrently and all of them settle; per-account
    /// failures are tallied, logged, and already recorded on the account row
    /// by the sync run itself.
    ///
    /// # Errors
    ///
    /// Returns an error only if the eligible accounts cannot be listed; from
    /// that point on the cycle always completes.
    pub async fn run_cycle(&self, selection: SyncSelection) -> Result<CycleReport, SyncError> {
        let accounts = db::accounts::list_sync_eligible_accounts(&self.inner.pool).await?;
        let mut report = CycleReport {
            accounts: accounts.len(),
            ..CycleReport::default()
        };

        let runs = accounts.into_iter().map(|account| {
            let syncer = self.inner.syncer.clone();
            async move {
                let outcome = syncer.run_selection(&account, selection).await;
                (account.id, account.name, outcome)
            }
        });

        for (account_id, account_name, outcome) in join_all(runs).await {
            match outcome {
                Ok(_) => report.succeeded += 1,
                Err(error) => {
                    report.failed += 1;
                    tracing::error!(
                        %account_id,
                        %account_name,
                        %error,
                        "account sync failed in scheduled cycle"
                    );
                }
            }
        }

        Ok(report)
    }

    /// Register an independent recurring schedule for one account,
    /// replacing any existing one.
    pub fn schedule_account(
        &self,
        account_id: AccountId,
        every: Duration,
        selection: SyncSelection,
    ) {
        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(error) = scheduler
                    .inner
                    .syncer
                    .run_account(account_id, selection)
                    .await
                {
                    tracing::warn!(%account_id, %error, "ad hoc sync failed");
                }
            }
        });

        let previous = {
            let mut tasks = self
                .inner
                .ad_hoc
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            tasks.insert(account_id, handle)
        };
        if let Some(previous) = previous {
            previous.abort();
        }
        tracing::info!(%account_id, every_secs = every.as_secs(), "ad hoc schedule registered");
    }

    /// Cancel an account's ad hoc schedule. Returns whether one existed.
    pub fn unschedule_account(&self, account_id: AccountId) -> bool {
        let removed = {
            let mut tasks = self
                .inner
                .ad_hoc
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            tasks.remove(&account_id)
        };
        match removed {
            Some(handle) => {
                handle.abort();
                tracing::info!(%account_id, "ad hoc schedule cancelled");
                true
            }
            None => false,
        }
    }
}
