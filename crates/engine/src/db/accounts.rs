//! Database operations for marketplace accounts.

use sqlx::PgPool;

use sellerglass_core::{AccountId, ConnectionStatus, OwnerId};

use super::RepositoryError;
use crate::models::account::{AccountRow, MarketplaceAccount, NewAccount};

/// Create a new account in `pending` status.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create_account(
    pool: &PgPool,
    input: &NewAccount,
) -> Result<MarketplaceAccount, RepositoryError> {
    let row = sqlx::query_as::<_, AccountRow>(
        r"
        INSERT INTO marketplace_accounts (
            owner_id, name, region, marketplace_id, seller_id,
            refresh_token, lwa_client_id, lwa_client_secret,
            aws_access_key_id, aws_secret_access_key, aws_role_arn
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING
            id, owner_id, name, region, marketplace_id, seller_id,
            refresh_token, lwa_client_id, lwa_client_secret,
            aws_access_key_id, aws_secret_access_key, aws_role_arn,
            status, last_synced_at, created_at, updated_at
        ",
    )
    .bind(input.owner_id)
    .bind(&input.name)
    .bind(input.region)
    .bind(&input.marketplace_id)
    .bind(&input.seller_id)
    .bind(&input.refresh_token)
    .bind(&input.lwa_client_id)
    .bind(&input.lwa_client_secret)
    .bind(&input.aws_access_key_id)
    .bind(&input.aws_secret_access_key)
    .bind(&input.aws_role_arn)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Get an account by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_account(
    pool: &PgPool,
    id: AccountId,
) -> Result<Option<MarketplaceAccount>, RepositoryError> {
    let row = sqlx::query_as::<_, AccountRow>(
        r"
        SELECT
            id, owner_id, name, region, marketplace_id, seller_id,
            refresh_token, lwa_client_id, lwa_client_secret,
            aws_access_key_id, aws_secret_access_key, aws_role_arn,
            status, last_synced_at, created_at, updated_at
        FROM marketplace_accounts
        WHERE id = $1
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Into::into))
}

/// List all accounts belonging to an owner, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_accounts_by_owner(
    pool: &PgPool,
    owner_id: OwnerId,
) -> Result<Vec<MarketplaceAccount>, RepositoryError> {
    let rows = sqlx::query_as::<_, AccountRow>(
        r"
        SELECT
            id, owner_id, name, region, marketplace_id, seller_id,
            refresh_token, lwa_client_id, lwa_client_secret,
            aws_access_key_id, aws_secret_access_key, aws_role_arn,
            status, last_synced_at, created_at, updated_at
        FROM marketplace_accounts
        WHERE owner_id = $1
        ORDER BY created_at DESC
        ",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// List every account regardless of owner or status. Operator tooling only.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_all_accounts(pool: &PgPool) -> Result<Vec<MarketplaceAccount>, RepositoryError> {
    let rows = sqlx::query_as::<_, AccountRow>(
        r"
        SELECT
            id, owner_id, name, region, marketplace_id, seller_id,
            refresh_token, lwa_client_id, lwa_client_secret,
            aws_access_key_id, aws_secret_access_key, aws_role_arn,
            status, last_synced_at, created_at, updated_at
        FROM marketplace_accounts
        ORDER BY created_at ASC
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// List every account the scheduler should pick up.
///
/// Accounts in `error` stay eligible so transient failures self-heal on the
/// next cycle; `pending` and `disconnected` accounts are skipped.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_sync_eligible_accounts(
    pool: &PgPool,
) -> Result<Vec<MarketplaceAccount>, RepositoryError> {
    let rows = sqlx::query_as::<_, AccountRow>(
        r"
        SELECT
            id, owner_id, name, region, marketplace_id, seller_id,
            refresh_token, lwa_client_id, lwa_client_secret,
            aws_access_key_id, aws_secret_access_key, aws_role_arn,
            status, last_synced_at, created_at, updated_at
        FROM marketplace_accounts
        WHERE status IN ('connected', 'error')
        ORDER BY created_at ASC
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Set an account's connection status without touching the sync timestamp.
///
/// Used for lifecycle transitions (verification, disconnect); sync attempts
/// go through [`record_sync_outcome`] instead.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the account doesn't exist.
pub async fn set_status(
    pool: &PgPool,
    id: AccountId,
    status: ConnectionStatus,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE marketplace_accounts
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(id)
    .bind(status)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Record the outcome of a sync attempt.
///
/// The sync timestamp is refreshed unconditionally so "last attempt" stays
/// visible even when the attempt failed.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the account doesn't exist.
pub async fn record_sync_outcome(
    pool: &PgPool,
    id: AccountId,
    status: ConnectionStatus,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE marketplace_accounts
        SET status = $2, last_synced_at = NOW(), updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(id)
    .bind(status)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Replace an account's stored credentials, resetting it to `pending`.
///
/// `None` fields keep their current value, so a reconnect can rotate just
/// the refresh token.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the account doesn't exist.
pub async fn update_credentials(
    pool: &PgPool,
    id: AccountId,
    update: &CredentialUpdate,
) -> Result<MarketplaceAccount, RepositoryError> {
    let row = sqlx::query_as::<_, AccountRow>(
        r"
        UPDATE marketplace_accounts
        SET
            refresh_token = COALESCE($2, refresh_token),
            lwa_client_id = COALESCE($3, lwa_client_id),
            lwa_client_secret = COALESCE($4, lwa_client_secret),
            aws_access_key_id = COALESCE($5, aws_access_key_id),
            aws_secret_access_key = COALESCE($6, aws_secret_access_key),
            aws_role_arn = COALESCE($7, aws_role_arn),
            status = 'pending',
            updated_at = NOW()
        WHERE id = $1
        RETURNING
            id, owner_id, name, region, marketplace_id, seller_id,
            refresh_token, lwa_client_id, lwa_client_secret,
            aws_access_key_id, aws_secret_access_key, aws_role_arn,
            status, last_synced_at, created_at, updated_at
        ",
    )
    .bind(id)
    .bind(&update.refresh_token)
    .bind(&update.lwa_client_id)
    .bind(&update.lwa_client_secret)
    .bind(&update.aws_access_key_id)
    .bind(&update.aws_secret_access_key)
    .bind(&update.aws_role_arn)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(row.into())
}

/// Delete an account; listings, orders and transactions cascade.
///
/// # Returns
///
/// Returns `true` if the account was deleted, `false` if it didn't exist.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete_account(pool: &PgPool, id: AccountId) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        DELETE FROM marketplace_accounts
        WHERE id = $1
        ",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Partial credential rotation; `None` keeps the stored value.
#[derive(Clone, Default, serde::Deserialize)]
pub struct CredentialUpdate {
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub lwa_client_id: Option<String>,
    #[serde(default)]
    pub lwa_client_secret: Option<String>,
    #[serde(default)]
    pub aws_access_key_id: Option<String>,
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,
    #[serde(default)]
    pub aws_role_arn: Option<String>,
}

impl std::fmt::Debug for CredentialUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialUpdate")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("lwa_client_id", &self.lwa_client_id)
            .field("lwa_client_secret", &self.lwa_client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field(
                "aws_secret_access_key",
                &self.aws_secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("aws_role_arn", &self.aws_role_arn)
            .finish()
    }
}
