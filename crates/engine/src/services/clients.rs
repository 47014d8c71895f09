//! Per-account SP-API client cache.
//!
//! Each account gets one [`SpApiClient`] for the life of the process so its
//! cached LWA token is shared by every sync task touching that account.
//! Entries are evicted when an account is deleted or its credentials change;
//! the next call rebuilds the client from storage.

use moka::future::Cache;
use sellerglass_core::AccountId;
use url::Url;

use crate::db;
use crate::models::account::MarketplaceAccount;
use crate::spapi::auth::LwaCredentials;
use crate::spapi::{SpApiClient, SpApiError};

use super::SyncError;

/// Fixed endpoints every client is routed at instead of each account's
/// region. Used when a local server stands in for the remote service.
#[derive(Debug, Clone)]
pub struct EndpointOverride {
    /// SP-API base URL.
    pub api: Url,
    /// LWA token URL.
    pub token: Url,
}

/// Hands out cached SP-API clients keyed by account id.
#[derive(Clone)]
pub struct ClientManager {
    pool: sqlx::PgPool,
    cache: Cache<AccountId, SpApiClient>,
    endpoints: Option<EndpointOverride>,
}

impl ClientManager {
    #[must_use]
    pub fn new(pool: sqlx::PgPool) -> Self {
        // Entries only leave via evict(); the capacity bound is a backstop
        // for long-lived processes serving many tenants.
        let cache = Cache::builder().max_capacity(1_024).build();
        Self {
            pool,
            cache,
            endpoints: None,
        }
    }

    /// A manager whose clients all target `endpoints`, regardless of each
    /// account's region.
    #[must_use]
    pub fn with_endpoints(pool: sqlx::PgPool, endpoints: EndpointOverride) -> Self {
        Self {
            endpoints: Some(endpoints),
            ..Self::new(pool)
        }
    }

    /// Client for an account row the caller already holds.
    ///
    /// # Errors
    ///
    /// Returns an error if a new client cannot be constructed.
    pub async fn client_for(
        &self,
        account: &MarketplaceAccount,
    ) -> Result<SpApiClient, SpApiError> {
        if let Some(client) = self.cache.get(&account.id).await {
            return Ok(client);
        }

        let credentials = LwaCredentials {
            client_id: account.lwa_client_id.clone(),
            client_secret: account.lwa_client_secret.clone(),
            refresh_token: account.refresh_token.clone(),
        };
        let client = match &self.endpoints {
            Some(endpoints) => SpApiClient::with_endpoints(
                endpoints.api.clone(),
                endpoints.token.clone(),
                account.marketplace_id.clone(),
                credentials,
            )?,
            None => {
                SpApiClient::new(account.region, account.marketplace_id.clone(), credentials)?
            }
        };
        self.cache.insert(account.id, client.clone()).await;
        Ok(client)
    }

    /// Client by account id, loading credentials from storage on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or the client cannot be
    /// constructed.
    pub async fn client(&self, account_id: AccountId) -> Result<SpApiClient, SyncError> {
        if let Some(client) = self.cache.get(&account_id).await {
            return Ok(client);
        }

        let account = db::accounts::get_account(&self.pool, account_id)
            .await?
            .ok_or(SyncError::AccountNotFound(account_id))?;
        Ok(self.client_for(&account).await?)
    }

    /// Drop the cached client so the next call rebuilds it with fresh
    /// credentials.
    pub async fn evict(&self, account_id: AccountId) {
        self.cache.invalidate(&account_id).await;
    }
}
