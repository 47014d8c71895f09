//! Integration tests for the append-only cost version ledger.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (cargo run -p sellerglass-cli -- migrate)
//! - `ENGINE_DATABASE_URL` (or `DATABASE_URL`) pointing at it
//!
//! Run with: cargo test -p sellerglass-integration-tests -- --ignored

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use sellerglass_core::{CostComponents, OwnerId, ProductId};
use sellerglass_engine::db;
use sellerglass_engine::db::RepositoryError;
use sellerglass_engine::models::{NewCostVersion, NewProduct, Product};

async fn engine_pool() -> PgPool {
    let database_url = std::env::var("ENGINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("ENGINE_DATABASE_URL not set");

    db::create_pool(&database_url)
        .await
        .expect("Failed to connect to engine database")
}

/// Seed a throwaway product; a random SKU keeps runs independent.
async fn seeded_product(pool: &PgPool) -> Product {
    let input = NewProduct {
        owner_id: OwnerId::generate(),
        internal_sku: None,
        sku: format!("IT-{}", Uuid::new_v4()),
        name: "Ledger test product".to_owned(),
        category: None,
        weight_g: None,
        length_cm: None,
        width_cm: None,
        height_cm: None,
    };
    db::products::create_product(pool, &input)
        .await
        .expect("Failed to seed product")
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, 0, 0, 0)
        .single()
        .expect("valid time")
}

fn cost(base_cents: i64, effective_from: DateTime<Utc>) -> NewCostVersion {
    NewCostVersion {
        components: CostComponents {
            base_cost: Decimal::new(base_cents, 2),
            shipping_cost: Decimal::new(150, 2),
            ..Default::default()
        },
        effective_from: Some(effective_from),
        created_by: None,
    }
}

// =============================================================================
// Append Semantics
// =============================================================================

#[tokio::test]
#[ignore = "Requires a migrated engine database"]
async fn test_first_version_opens_the_ledger() {
    let pool = engine_pool().await;
    let product = seeded_product(&pool).await;

    let created = db::costs::create_cost_version(&pool, product.id, &cost(1000, at(1)))
        .await
        .expect("append v1");

    assert_eq!(created.version, 1);
    assert!(created.is_open());
    assert_eq!(created.total_cost, Decimal::new(1150, 2));
}

#[tokio::test]
#[ignore = "Requires a migrated engine database"]
async fn test_append_closes_the_open_version_at_the_new_start() {
    let pool = engine_pool().await;
    let product = seeded_product(&pool).await;

    db::costs::create_cost_version(&pool, product.id, &cost(1000, at(1)))
        .await
        .expect("append v1");
    db::costs::create_cost_version(&pool, product.id, &cost(1200, at(10)))
        .await
        .expect("append v2");

    let history = db::costs::list_cost_versions(&pool, product.id)
        .await
        .expect("history");
    assert_eq!(history.len(), 2);

    // Newest first
    let v2 = history.first().expect("v2");
    let v1 = history.last().expect("v1");
    assert_eq!(v2.version, 2);
    assert!(v2.is_open());
    assert_eq!(v1.version, 1);
    assert_eq!(v1.effective_to, Some(at(10)));
}

#[tokio::test]
#[ignore = "Requires a migrated engine database"]
async fn test_rewriting_closed_history_is_rejected() {
    let pool = engine_pool().await;
    let product = seeded_product(&pool).await;

    db::costs::create_cost_version(&pool, product.id, &cost(1000, at(10)))
        .await
        .expect("append v1");

    let result = db::costs::create_cost_version(&pool, product.id, &cost(900, at(5))).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    // The open version is untouched
    let history = db::costs::list_cost_versions(&pool, product.id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
}

#[tokio::test]
#[ignore = "Requires a migrated engine database"]
async fn test_unknown_product_is_not_found() {
    let pool = engine_pool().await;

    let result =
        db::costs::create_cost_version(&pool, ProductId::generate(), &cost(1000, at(1))).await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

// =============================================================================
// As-Of Resolution
// =============================================================================

#[tokio::test]
#[ignore = "Requires a migrated engine database"]
async fn test_as_of_resolves_the_version_in_effect() {
    let pool = engine_pool().await;
    let product = seeded_product(&pool).await;

    db::costs::create_cost_version(&pool, product.id, &cost(1000, at(1)))
        .await
        .expect("append v1");
    db::costs::create_cost_version(&pool, product.id, &cost(1200, at(10)))
        .await
        .expect("append v2");

    // Before any version
    let before = db::costs::current_cost_version(&pool, product.id, at(1) - chrono::Duration::days(1))
        .await
        .expect("lookup");
    assert!(before.is_none());

    // Inside the closed window: historical margins stay stable
    let mid = db::costs::current_cost_version(&pool, product.id, at(5))
        .await
        .expect("lookup")
        .expect("v1 in effect");
    assert_eq!(mid.version, 1);
    assert_eq!(mid.base_cost, Decimal::new(1000, 2));

    // At the boundary the newer version wins
    let boundary = db::costs::current_cost_version(&pool, product.id, at(10))
        .await
        .expect("lookup")
        .expect("v2 in effect");
    assert_eq!(boundary.version, 2);

    // After the boundary, the open version
    let open = db::costs::current_cost_version(&pool, product.id, at(20))
        .await
        .expect("lookup")
        .expect("open version");
    assert_eq!(open.version, 2);
    assert!(open.is_open());
}
