//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Run engine migrations
//! sg-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ENGINE_DATABASE_URL` - `PostgreSQL` connection string for the engine
//!   (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Engine migrations: `crates/engine/migrations/`

use secrecy::SecretString;
use thiserror::Error;

use sellerglass_engine::db;

/// Errors that can occur while running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run engine database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn engine() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ENGINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("ENGINE_DATABASE_URL"))?;

    tracing::info!("Connecting to engine database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running engine migrations...");
    sqlx::migrate!("../engine/migrations").run(&pool).await?;

    tracing::info!("Engine migrations complete!");
    Ok(())
}
