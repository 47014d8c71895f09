//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::{AccountService, ClientManager, SyncScheduler, SyncService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and the service graph.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    clients: ClientManager,
    accounts: AccountService,
    syncer: SyncService,
    scheduler: SyncScheduler,
}

impl AppState {
    /// Create a new application state, wiring the service graph onto the pool.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let clients = ClientManager::new(pool.clone());
        let syncer = SyncService::new(pool.clone(), clients.clone());
        let accounts = AccountService::new(pool.clone(), clients.clone());
        let scheduler = SyncScheduler::new(pool.clone(), syncer.clone(), config.sync);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                clients,
                accounts,
                syncer,
                scheduler,
            }),
        }
    }

    /// Get a reference to the engine configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the per-account SP-API client cache.
    #[must_use]
    pub fn clients(&self) -> &ClientManager {
        &self.inner.clients
    }

    /// Get a reference to the account lifecycle service.
    #[must_use]
    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }

    /// Get a reference to the sync service.
    #[must_use]
    pub fn syncer(&self) -> &SyncService {
        &self.inner.syncer
    }

    /// Get a reference to the recurring sync scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &SyncScheduler {
        &self.inner.scheduler
    }
}
