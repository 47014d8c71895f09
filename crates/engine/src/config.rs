//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ENGINE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `ENGINE_HOST` - Bind address (default: 127.0.0.1)
//! - `ENGINE_PORT` - Listen port (default: 3002)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment (e.g., "production")
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 1.0)
//!
//! ## Optional (Scheduler)
//! - `SYNC_SCHEDULER_ENABLED` - Run recurring sync cycles (default: true)
//! - `SYNC_FREQUENT_INTERVAL_SECS` - Orders + finances cadence (default: 3600)
//! - `SYNC_FULL_INTERVAL_SECS` - Products + orders + finances cadence
//!   (default: 21600)
//! - `SYNC_REFRESH_INTERVAL_SECS` - Full cadence with catalog re-enrichment
//!   (default: 86400)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// Recurring sync scheduler configuration
    pub sync: SyncConfig,
}

/// Recurring sync scheduler configuration.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Whether the recurring cadences are spawned at startup
    pub scheduler_enabled: bool,
    /// Cadence for orders + finances
    pub frequent_interval: Duration,
    /// Cadence for products + orders + finances
    pub full_interval: Duration,
    /// Cadence forcing catalog re-enrichment on top of a full sync
    pub refresh_interval: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ENGINE_DATABASE_URL")?;
        let host = get_env_or_default("ENGINE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ENGINE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ENGINE_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ENGINE_PORT".to_string(), e.to_string()))?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        let sync = SyncConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            sync,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SyncConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            scheduler_enabled: get_bool_or_default("SYNC_SCHEDULER_ENABLED", true)?,
            frequent_interval: get_duration_or_default("SYNC_FREQUENT_INTERVAL_SECS", 3_600)?,
            full_interval: get_duration_or_default("SYNC_FULL_INTERVAL_SECS", 21_600)?,
            refresh_interval: get_duration_or_default("SYNC_REFRESH_INTERVAL_SECS", 86_400)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., ENGINE_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a boolean environment variable with a default value.
fn get_bool_or_default(key: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_bool(key, &raw),
        Err(_) => Ok(default),
    }
}

/// Get a duration (in seconds) environment variable with a default value.
fn get_duration_or_default(key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => parse_duration_secs(key, &raw),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}

/// Parse a boolean flag; accepts `true`/`false`/`1`/`0` (case-insensitive).
fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true/false/1/0, got '{other}'"),
        )),
    }
}

/// Parse a positive duration given in whole seconds.
fn parse_duration_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
