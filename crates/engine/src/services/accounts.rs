//! Account lifecycle: connect, verify, reconnect, disconnect, delete.
//!
//! Connecting stores the credentials first (the account starts `pending`),
//! then verifies them once against the live API. Verification failing is not
//! an error to the caller - the account simply stays `pending` with the
//! reason reported, so the user can fix a typo'd secret and reconnect
//! without re-entering everything.

use sellerglass_core::{AccountId, ConnectionStatus};
use sqlx::PgPool;

use crate::db;
use crate::db::accounts::CredentialUpdate;
use crate::error::AppError;
use crate::models::account::{MarketplaceAccount, NewAccount};
use crate::spapi::types::MarketplaceParticipation;

use super::SyncError;
use super::clients::ClientManager;

/// Result of connecting or reconnecting an account.
#[derive(Debug)]
pub struct ConnectOutcome {
    pub account: MarketplaceAccount,
    /// Whether live verification succeeded and the account went `connected`.
    pub verified: bool,
    /// Why verification failed, when it did.
    pub error: Option<String>,
}

/// Manages marketplace account records and their client-cache entries.
#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
    clients: ClientManager,
}

impl AccountService {
    #[must_use]
    pub fn new(pool: PgPool, clients: ClientManager) -> Self {
        Self { pool, clients }
    }

    /// Store a new account and verify its credentials once.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed input or a storage failure; a failed
    /// verification is reported inside the `Ok` outcome instead.
    pub async fn connect(&self, input: NewAccount) -> Result<ConnectOutcome, AppError> {
        validate_new_account(&input).map_err(AppError::BadRequest)?;

        let account = db::accounts::create_account(&self.pool, &input).await?;
        tracing::info!(
            account_id = %account.id,
            name = %account.name,
            region = %account.region,
            "account stored, verifying credentials"
        );

        self.verify_and_activate(account).await
    }

    /// Rotate stored credentials and re-verify.
    ///
    /// The rotation is partial: fields left out of `update` keep their
    /// stored value. The cached client is evicted so the next call uses the
    /// fresh credentials.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown account id.
    pub async fn reconnect(
        &self,
        account_id: AccountId,
        update: CredentialUpdate,
    ) -> Result<ConnectOutcome, AppError> {
        let account = db::accounts::update_credentials(&self.pool, account_id, &update).await?;
        self.clients.evict(account_id).await;
        self.verify_and_activate(account).await
    }

    /// Manually opt an account out of all syncing.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown account id.
    pub async fn disconnect(&self, account_id: AccountId) -> Result<(), AppError> {
        db::accounts::set_status(&self.pool, account_id, ConnectionStatus::Disconnected).await?;
        self.clients.evict(account_id).await;
        tracing::info!(%account_id, "account disconnected");
        Ok(())
    }

    /// Delete an account; dependent rows cascade and the cached client is
    /// dropped. Returns `false` if the account did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn delete(&self, account_id: AccountId) -> Result<bool, AppError> {
        let deleted = db::accounts::delete_account(&self.pool, account_id).await?;
        if deleted {
            self.clients.evict(account_id).await;
            tracing::info!(%account_id, "account deleted");
        }
        Ok(deleted)
    }

    async fn verify_and_activate(
        &self,
        account: MarketplaceAccount,
    ) -> Result<ConnectOutcome, AppError> {
        match self.verify(&account).await {
            Ok(()) => {
                db::accounts::set_status(&self.pool, account.id, ConnectionStatus::Connected)
                    .await?;
                let mut account = account;
                account.status = ConnectionStatus::Connected;
                tracing::info!(account_id = %account.id, "account verified and connected");
                Ok(ConnectOutcome {
                    account,
                    verified: true,
                    error: None,
                })
            }
            Err(error) => {
                tracing::warn!(
                    account_id = %account.id,
                    %error,
                    "account verification failed, staying pending"
                );
                Ok(ConnectOutcome {
                    account,
                    verified: false,
                    error: Some(error.to_string()),
                })
            }
        }
    }

    /// Exchange the refresh token once and confirm the configured marketplace
    /// is actually among the seller's participations.
    async fn verify(&self, account: &MarketplaceAccount) -> Result<(), SyncError> {
        let client = self.clients.client_for(account).await?;
        let participations = client.get_marketplace_participations().await?;

        if marketplace_accessible(&participations, &account.marketplace_id) {
            Ok(())
        } else {
            Err(SyncError::MarketplaceNotAccessible(
                account.marketplace_id.clone(),
            ))
        }
    }
}

/// Check a connect payload before anything touches storage.
pub(crate) fn validate_new_account(input: &NewAccount) -> Result<(), String> {
    let required = [
        ("name", &input.name),
        ("marketplace_id", &input.marketplace_id),
        ("seller_id", &input.seller_id),
        ("refresh_token", &input.refresh_token),
        ("lwa_client_id", &input.lwa_client_id),
        ("lwa_client_secret", &input.lwa_client_secret),
        ("aws_access_key_id", &input.aws_access_key_id),
        ("aws_secret_access_key", &input.aws_secret_access_key),
        ("aws_role_arn", &input.aws_role_arn),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(format!("{field} must not be empty"));
        }
    }

    Ok(())
}

/// Whether the seller actively participates in the given marketplace.
pub(crate) fn marketplace_accessible(
    participations: &[MarketplaceParticipation],
    marketplace_id: &str,
) -> bool {
    participations.iter().any(|participation| {
        participation.marketplace.id == marketplace_id
            && participation.participation.is_participating
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spapi::types::{MarketplaceInfo, Participation};
    use sellerglass_core::{OwnerId, Region};

    fn new_account() -> NewAccount {
        NewAccount {
            owner_id: OwnerId::generate(),
            name: "BR storefront".to_owned(),
            region: Region::Br,
            marketplace_id: "A2Q3Y263D00KWC".to_owned(),
            seller_id: "A3EXAMPLE".to_owned(),
            refresh_token: "Atzr|token".to_owned(),
            lwa_client_id: "amzn1.application-oa2-client.abc".to_owned(),
            lwa_client_secret: "lwa-secret".to_owned(),
            aws_access_key_id: "AKIAEXAMPLE".to_owned(),
            aws_secret_access_key: "aws-secret".to_owned(),
            aws_role_arn: "arn:aws:iam::123456789012:role/spapi".to_owned(),
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        assert_eq!(validate_new_account(&new_account()), Ok(()));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut input = new_account();
        input.name = "  ".to_owned();
        assert_eq!(
            validate_new_account(&input),
            Err("name must not be empty".to_owned())
        );
    }

    #[test]
    fn test_missing_credential_is_rejected() {
        let mut input = new_account();
        input.refresh_token = String::new();
        assert_eq!(
            validate_new_account(&input),
            Err("refresh_token must not be empty".to_owned())
        );
    }

    fn participation(marketplace_id: &str, participating: bool) -> MarketplaceParticipation {
        MarketplaceParticipation {
            marketplace: MarketplaceInfo {
                id: marketplace_id.to_owned(),
                name: "Amazon.com.br".to_owned(),
                country_code: "BR".to_owned(),
                default_currency_code: Some("BRL".to_owned()),
            },
            participation: Participation {
                is_participating: participating,
                has_suspended_listings: false,
            },
        }
    }

    #[test]
    fn test_marketplace_must_be_listed_and_active() {
        let listed = vec![
            participation("ATVPDKIKX0DER", true),
            participation("A2Q3Y263D00KWC", true),
        ];
        assert!(marketplace_accessible(&listed, "A2Q3Y263D00KWC"));
        assert!(!marketplace_accessible(&listed, "A1PA6795UKMFR9"));

        let inactive = vec![participation("A2Q3Y263D00KWC", false)];
        assert!(!marketplace_accessible(&inactive, "A2Q3Y263D00KWC"));

        assert!(!marketplace_accessible(&[], "A2Q3Y263D00KWC"));
    }
}
