//! Authenticated SP-API REST client.
//!
//! One client exists per marketplace account. The client owns the account's
//! LWA credentials and a cached bearer token that is re-exchanged
//! transparently when it crosses the expiry safety margin, so callers never
//! deal with token lifetimes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use secrecy::ExposeSecret;
use sellerglass_core::Region;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use url::Url;

use super::SpApiError;
use super::auth::{self, LwaCredentials, LwaToken};
use super::types::{
    CatalogItem, FinancialEventsPage, FinancialEventsResponse, InventorySummariesPage,
    InventorySummariesResponse, MarketplaceParticipation, MarketplaceParticipationsResponse,
    OrderItemsPage, OrderItemsResponse, OrdersPage, OrdersResponse,
};

const USER_AGENT: &str = concat!("sellerglass/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout. A stuck call fails the current sync attempt instead
/// of wedging the whole cycle.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fallback when a 429 response carries no usable Retry-After header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// SP-API client bound to one account's region, marketplace and credentials.
///
/// Cheap to clone; clones share the HTTP connection pool and the cached
/// bearer token.
#[derive(Clone)]
pub struct SpApiClient {
    inner: Arc<SpApiClientInner>,
}

struct SpApiClientInner {
    http: reqwest::Client,
    endpoint: Url,
    token_endpoint: Url,
    marketplace_id: String,
    credentials: LwaCredentials,
    token: RwLock<Option<LwaToken>>,
}

impl std::fmt::Debug for SpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpApiClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("marketplace_id", &self.inner.marketplace_id)
            .finish_non_exhaustive()
    }
}

impl SpApiClient {
    /// Build a client for one account.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed
    /// or the region endpoint fails to parse.
    pub fn new(
        region: Region,
        marketplace_id: impl Into<String>,
        credentials: LwaCredentials,
    ) -> Result<Self, SpApiError> {
        let endpoint = Url::parse(region.endpoint())?;
        let token_endpoint = Url::parse(auth::TOKEN_ENDPOINT)?;
        Self::with_endpoints(endpoint, token_endpoint, marketplace_id, credentials)
    }

    /// Build a client against explicit API and token endpoints.
    ///
    /// [`SpApiClient::new`] covers production, where both endpoints follow
    /// from the account's region; this constructor exists so a local server
    /// can stand in for the remote service.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn with_endpoints(
        endpoint: Url,
        token_endpoint: Url,
        marketplace_id: impl Into<String>,
        credentials: LwaCredentials,
    ) -> Result<Self, SpApiError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(SpApiClientInner {
                http,
                endpoint,
                token_endpoint,
                marketplace_id: marketplace_id.into(),
                credentials,
                token: RwLock::new(None),
            }),
        })
    }

    /// Marketplace this client is scoped to.
    #[must_use]
    pub fn marketplace_id(&self) -> &str {
        &self.inner.marketplace_id
    }

    /// Current bearer token, exchanging the refresh token if the cached one
    /// is missing or inside the expiry margin.
    async fn bearer_token(&self) -> Result<String, SpApiError> {
        {
            let guard = self.inner.token.read().await;
            if let Some(token) = guard.as_ref() {
                if !token.is_expired() {
                    return Ok(token.access_token.expose_secret().to_owned());
                }
            }
        }

        let mut guard = self.inner.token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = guard.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.expose_secret().to_owned());
            }
        }

        debug!("exchanging refresh token for a new bearer token");
        let token = auth::exchange_refresh_token(
            &self.inner.http,
            &self.inner.token_endpoint,
            &self.inner.credentials,
        )
        .await?;
        let access_token = token.access_token.expose_secret().to_owned();
        *guard = Some(token);

        Ok(access_token)
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, SpApiError>
    where
        T: DeserializeOwned,
    {
        let token = self.bearer_token().await?;
        let url = self.inner.endpoint.join(path)?;

        let response = self
            .inner
            .http
            .get(url)
            .header("x-amz-access-token", token)
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T>(response: reqwest::Response) -> Result<T, SpApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| SpApiError::Parse(e.to_string()));
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                Err(SpApiError::RateLimited(retry_after))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(SpApiError::AuthenticationFailed(format!(
                    "HTTP {status}: {body}"
                )))
            }
            StatusCode::NOT_FOUND => {
                let path = response.url().path().to_owned();
                Err(SpApiError::NotFound(path))
            }
            _ => {
                let message = parse_error_body(response).await;
                Err(SpApiError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Marketplaces the seller participates in. Used to verify that freshly
    /// stored credentials actually work before an account goes `connected`.
    #[instrument(skip(self))]
    pub async fn get_marketplace_participations(
        &self,
    ) -> Result<Vec<MarketplaceParticipation>, SpApiError> {
        let response: MarketplaceParticipationsResponse = self
            .get("/sellers/v1/marketplaceParticipations", &[])
            .await?;
        Ok(response.payload)
    }

    /// One page of FBA inventory summaries for the client's marketplace.
    #[instrument(skip(self, next_token))]
    pub async fn get_inventory_summaries(
        &self,
        next_token: Option<&str>,
    ) -> Result<InventorySummariesPage, SpApiError> {
        let mut query = vec![
            ("granularityType", "Marketplace".to_owned()),
            ("granularityId", self.inner.marketplace_id.clone()),
            ("marketplaceIds", self.inner.marketplace_id.clone()),
        ];
        if let Some(token) = next_token {
            query.push(("nextToken", token.to_owned()));
        }

        let response: InventorySummariesResponse =
            self.get("/fba/inventory/v1/summaries", &query).await?;

        Ok(InventorySummariesPage {
            summaries: response.payload.inventory_summaries,
            next_token: response.pagination.and_then(|p| p.next_token),
        })
    }

    /// Catalog detail for one ASIN, restricted to the summaries data set.
    #[instrument(skip(self))]
    pub async fn get_catalog_item(&self, asin: &str) -> Result<CatalogItem, SpApiError> {
        let query = vec![
            ("marketplaceIds", self.inner.marketplace_id.clone()),
            ("includedData", "summaries".to_owned()),
        ];

        self.get(&format!("/catalog/2022-04-01/items/{asin}"), &query)
            .await
    }

    /// One page of orders created after `created_after`.
    ///
    /// Only settled orders (`Shipped`, `Delivered`) are requested; anything
    /// earlier in the order lifecycle is not economically final.
    #[instrument(skip(self, next_token))]
    pub async fn get_orders(
        &self,
        created_after: DateTime<Utc>,
        next_token: Option<&str>,
    ) -> Result<OrdersPage, SpApiError> {
        let query = match next_token {
            // With a NextToken the service replays the original filters
            Some(token) => vec![
                ("MarketplaceIds", self.inner.marketplace_id.clone()),
                ("NextToken", token.to_owned()),
            ],
            None => vec![
                ("MarketplaceIds", self.inner.marketplace_id.clone()),
                (
                    "CreatedAfter",
                    created_after.to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                ("OrderStatuses", "Shipped,Delivered".to_owned()),
            ],
        };

        let response: OrdersResponse = self.get("/orders/v0/orders", &query).await?;

        Ok(OrdersPage {
            orders: response.payload.orders,
            next_token: response.payload.next_token,
        })
    }

    /// One page of line items for an order.
    #[instrument(skip(self, next_token))]
    pub async fn get_order_items(
        &self,
        amazon_order_id: &str,
        next_token: Option<&str>,
    ) -> Result<OrderItemsPage, SpApiError> {
        let mut query = Vec::new();
        if let Some(token) = next_token {
            query.push(("NextToken", token.to_owned()));
        }

        let response: OrderItemsResponse = self
            .get(&format!("/orders/v0/orders/{amazon_order_id}/orderItems"), &query)
            .await?;

        Ok(OrderItemsPage {
            items: response.payload.order_items,
            next_token: response.payload.next_token,
        })
    }

    /// One page of financial events posted after `posted_after`.
    #[instrument(skip(self, next_token))]
    pub async fn list_financial_events(
        &self,
        posted_after: DateTime<Utc>,
        next_token: Option<&str>,
    ) -> Result<FinancialEventsPage, SpApiError> {
        let query = match next_token {
            Some(token) => vec![("NextToken", token.to_owned())],
            None => vec![
                (
                    "PostedAfter",
                    posted_after.to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                ("MaxResultsPerPage", "100".to_owned()),
            ],
        };

        let response: FinancialEventsResponse =
            self.get("/finances/v0/financialEvents", &query).await?;

        Ok(FinancialEventsPage {
            events: response.payload.financial_events,
            next_token: response.payload.next_token,
        })
    }
}

/// Extract a readable message from an SP-API error body.
///
/// Error responses look like `{"errors": [{"code", "message", "details"}]}`;
/// anything that does not parse is returned verbatim.
async fn parse_error_body(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) if !body.errors.is_empty() => body
            .errors
            .iter()
            .map(|e| match &e.code {
                Some(code) => format!("{code}: {}", e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => text,
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_credentials() -> LwaCredentials {
        LwaCredentials {
            client_id: "amzn1.application-oa2-client.test".to_owned(),
            client_secret: SecretString::from("secret"),
            refresh_token: SecretString::from("Atzr|refresh"),
        }
    }

    #[test]
    fn test_client_uses_region_endpoint() {
        let client = SpApiClient::new(Region::Br, "A2Q3Y263D00KWC", test_credentials())
            .expect("client");
        assert_eq!(
            client.inner.endpoint.as_str(),
            "https://sellingpartnerapi-na.amazon.com/"
        );
        assert_eq!(client.marketplace_id(), "A2Q3Y263D00KWC");
    }

    #[test]
    fn test_debug_does_not_leak_credentials() {
        let client =
            SpApiClient::new(Region::Eu, "A1PA6795UKMFR9", test_credentials()).expect("client");
        let rendered = format!("{client:?}");
        assert!(rendered.contains("sellingpartnerapi-eu"));
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("Atzr"));
    }

    #[test]
    fn test_error_body_parsing() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"errors": [{"code": "InvalidInput", "message": "Invalid marketplace id"}]}"#,
        )
        .expect("error body");
        assert_eq!(body.errors.len(), 1);
        assert_eq!(body.errors[0].code.as_deref(), Some("InvalidInput"));
    }
}
