//! CLI command implementations.

pub mod accounts;
pub mod migrate;
pub mod sync;

use secrecy::SecretString;
use sqlx::PgPool;

use sellerglass_engine::db;

/// Connect to the engine database using the same environment variables the
/// engine itself reads.
pub(crate) async fn engine_pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ENGINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "ENGINE_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    Ok(pool)
}
