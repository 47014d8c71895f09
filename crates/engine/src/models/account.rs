//! Marketplace account: one seller's connection to one Amazon region.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sellerglass_core::{AccountId, ConnectionStatus, OwnerId, Region};
use serde::{Deserialize, Serialize};

/// A connected (or connecting) Amazon marketplace account.
///
/// Secret material is wrapped in [`SecretString`] as soon as it leaves the
/// database and never appears in `Debug` output or API responses.
#[derive(Clone)]
pub struct MarketplaceAccount {
    pub id: AccountId,
    pub owner_id: OwnerId,
    pub name: String,
    pub region: Region,
    pub marketplace_id: String,
    pub seller_id: String,
    pub refresh_token: SecretString,
    pub lwa_client_id: String,
    pub lwa_client_secret: SecretString,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: SecretString,
    pub aws_role_arn: String,
    pub status: ConnectionStatus,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for MarketplaceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceAccount")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("name", &self.name)
            .field("region", &self.region)
            .field("marketplace_id", &self.marketplace_id)
            .field("seller_id", &self.seller_id)
            .field("status", &self.status)
            .field("last_synced_at", &self.last_synced_at)
            .finish_non_exhaustive()
    }
}

/// Database row for an account; secrets still in plain text columns.
#[derive(sqlx::FromRow)]
pub(crate) struct AccountRow {
    pub id: AccountId,
    pub owner_id: OwnerId,
    pub name: String,
    pub region: Region,
    pub marketplace_id: String,
    pub seller_id: String,
    pub refresh_token: String,
    pub lwa_client_id: String,
    pub lwa_client_secret: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_role_arn: String,
    pub status: ConnectionStatus,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRow> for MarketplaceAccount {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            region: row.region,
            marketplace_id: row.marketplace_id,
            seller_id: row.seller_id,
            refresh_token: SecretString::from(row.refresh_token),
            lwa_client_id: row.lwa_client_id,
            lwa_client_secret: SecretString::from(row.lwa_client_secret),
            aws_access_key_id: row.aws_access_key_id,
            aws_secret_access_key: SecretString::from(row.aws_secret_access_key),
            aws_role_arn: row.aws_role_arn,
            status: row.status,
            last_synced_at: row.last_synced_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// API view of an account. Carries everything but the credentials, which
/// never serialize.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub owner_id: OwnerId,
    pub name: String,
    pub region: Region,
    pub marketplace_id: String,
    pub seller_id: String,
    pub status: ConnectionStatus,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<MarketplaceAccount> for AccountSummary {
    fn from(account: MarketplaceAccount) -> Self {
        Self {
            id: account.id,
            owner_id: account.owner_id,
            name: account.name,
            region: account.region,
            marketplace_id: account.marketplace_id,
            seller_id: account.seller_id,
            status: account.status,
            last_synced_at: account.last_synced_at,
            created_at: account.created_at,
        }
    }
}

/// Input for connecting a new account. Accounts always start `pending`.
#[derive(Clone, Deserialize)]
pub struct NewAccount {
    pub owner_id: OwnerId,
    pub name: String,
    pub region: Region,
    pub marketplace_id: String,
    pub seller_id: String,
    pub refresh_token: String,
    pub lwa_client_id: String,
    pub lwa_client_secret: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_role_arn: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("owner_id", &self.owner_id)
            .field("name", &self.name)
            .field("region", &self.region)
            .field("marketplace_id", &self.marketplace_id)
            .field("seller_id", &self.seller_id)
            .finish_non_exhaustive()
    }
}
