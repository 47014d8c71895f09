//! Login-with-Amazon (LWA) token exchange.
//!
//! SP-API requests are authorized with short-lived bearer tokens obtained by
//! exchanging the account's long-lived refresh token at the LWA token
//! endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::SpApiError;

/// LWA token endpoint. Global; the same endpoint serves every region.
pub(crate) const TOKEN_ENDPOINT: &str = "https://api.amazon.com/auth/o2/token";

/// Seconds of remaining lifetime below which a token is treated as expired.
///
/// A standard token lives 3600 seconds and is considered usable for 3300.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Credentials needed to mint bearer tokens for one account.
#[derive(Clone)]
pub struct LwaCredentials {
    /// LWA application client ID.
    pub client_id: String,
    /// LWA application client secret.
    pub client_secret: SecretString,
    /// Long-lived refresh token granted when the seller authorized the app.
    pub refresh_token: SecretString,
}

impl std::fmt::Debug for LwaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LwaCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token obtained from an LWA token exchange.
#[derive(Debug, Clone)]
pub struct LwaToken {
    /// Bearer token for SP-API requests.
    pub access_token: SecretString,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
}

/// Response from the LWA token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
}

/// Exchange a refresh token for a fresh bearer token.
///
/// # Errors
///
/// Returns [`SpApiError::AuthenticationFailed`] if the exchange is rejected
/// (revoked refresh token, wrong client credentials) and [`SpApiError::Http`]
/// on network failures.
#[instrument(skip(client, token_url, credentials), fields(client_id = %credentials.client_id))]
pub async fn exchange_refresh_token(
    client: &reqwest::Client,
    token_url: &Url,
    credentials: &LwaCredentials,
) -> Result<LwaToken, SpApiError> {
    let now = chrono::Utc::now().timestamp();

    let response = client
        .post(token_url.clone())
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", credentials.refresh_token.expose_secret()),
            ("client_id", &credentials.client_id),
            ("client_secret", credentials.client_secret.expose_secret()),
        ])
        .send()
        .await?;

    let status = response.status();

    if status.is_success() {
        let token_response: TokenResponse = response.json().await?;

        Ok(LwaToken {
            access_token: SecretString::from(token_response.access_token),
            expires_at: now + token_response.expires_in,
        })
    } else {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(SpApiError::AuthenticationFailed(format!(
            "HTTP {status}: {error_text}"
        )))
    }
}

impl LwaToken {
    /// Check if the token should no longer be used.
    ///
    /// Applies the safety margin: a token is treated as expired while it may
    /// still have up to [`EXPIRY_MARGIN_SECS`] of real lifetime left, so a
    /// request started now cannot race the actual expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - EXPIRY_MARGIN_SECS
    }

    /// Check if the token will cross the safety margin within `seconds`.
    #[must_use]
    pub fn expires_within(&self, seconds: i64) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - EXPIRY_MARGIN_SECS - seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_expiring_in(seconds: i64) -> LwaToken {
        LwaToken {
            access_token: SecretString::from("test"),
            expires_at: chrono::Utc::now().timestamp() + seconds,
        }
    }

    #[test]
    fn test_token_expiry_margin() {
        // A standard 3600s token is usable
        assert!(!token_expiring_in(3600).is_expired());

        // A token with 6 minutes left is still inside the usable window
        assert!(!token_expiring_in(360).is_expired());

        // A token with 4 minutes left is within the 300s margin: expired
        assert!(token_expiring_in(240).is_expired());

        // A genuinely expired token
        assert!(token_expiring_in(-10).is_expired());
    }

    #[test]
    fn test_expires_within() {
        // 400s of real lifetime = 100s of usable lifetime
        let token = token_expiring_in(400);
        assert!(token.expires_within(120));
        assert!(!token.expires_within(30));
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let credentials = LwaCredentials {
            client_id: "amzn1.application-oa2-client.test".to_string(),
            client_secret: SecretString::from("super_secret_client_secret"),
            refresh_token: SecretString::from("Atzr|super_secret_refresh"),
        };

        let debug_output = format!("{credentials:?}");

        assert!(debug_output.contains("amzn1.application-oa2-client.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_client_secret"));
        assert!(!debug_output.contains("super_secret_refresh"));
    }
}
