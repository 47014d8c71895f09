//! Amazon Selling Partner API client.
//!
//! Provides access to the SP-API operations the sync engine relies on:
//! seller marketplace participations, FBA inventory summaries, catalog item
//! lookups, orders with line items, and settled financial events.
//!
//! # Architecture
//!
//! - One [`SpApiClient`] per marketplace account, pointed at the account's
//!   regional endpoint
//! - Login-with-Amazon (LWA) bearer tokens obtained from the account's
//!   long-lived refresh token, cached in memory, re-exchanged before expiry
//! - Plain REST/JSON; responses are deserialized into the types in
//!   [`types`]

pub mod auth;
pub mod client;
pub mod types;

pub use client::SpApiClient;

use thiserror::Error;

/// Errors that can occur when interacting with the SP-API.
#[derive(Debug, Error)]
pub enum SpApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by Amazon.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token exchange was rejected or the bearer token is no longer accepted.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A URL could not be constructed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SpApiError {
    /// Whether this error means the account's credentials are bad and every
    /// further call in the cycle would fail the same way.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}
