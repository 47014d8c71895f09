//! Database operations for the product catalog.

use std::collections::HashMap;

use sqlx::PgPool;

use sellerglass_core::{OwnerId, ProductId};

use super::RepositoryError;
use crate::models::product::{NewProduct, Product};

/// Create a product.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the owner already has a product
/// with this marketplace SKU, `RepositoryError::Database` otherwise.
pub async fn create_product(
    pool: &PgPool,
    input: &NewProduct,
) -> Result<Product, RepositoryError> {
    sqlx::query_as::<_, Product>(
        r"
        INSERT INTO products (
            owner_id, internal_sku, sku, name, category,
            weight_g, length_cm, width_cm, height_cm
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING
            id, owner_id, internal_sku, sku, name, category,
            weight_g, length_cm, width_cm, height_cm,
            created_at, updated_at
        ",
    )
    .bind(input.owner_id)
    .bind(&input.internal_sku)
    .bind(&input.sku)
    .bind(&input.name)
    .bind(&input.category)
    .bind(input.weight_g)
    .bind(input.length_cm)
    .bind(input.width_cm)
    .bind(input.height_cm)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.constraint() == Some("products_owner_sku_key")
        {
            return RepositoryError::Conflict(format!(
                "owner already has a product with SKU {}",
                input.sku
            ));
        }
        RepositoryError::Database(e)
    })
}

/// Get a product by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_product(
    pool: &PgPool,
    id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let product = sqlx::query_as::<_, Product>(
        r"
        SELECT
            id, owner_id, internal_sku, sku, name, category,
            weight_g, length_cm, width_cm, height_cm,
            created_at, updated_at
        FROM products
        WHERE id = $1
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

/// Find a product by its marketplace-facing SKU within one owner's catalog.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_product_by_sku(
    pool: &PgPool,
    owner_id: OwnerId,
    sku: &str,
) -> Result<Option<Product>, RepositoryError> {
    let product = sqlx::query_as::<_, Product>(
        r"
        SELECT
            id, owner_id, internal_sku, sku, name, category,
            weight_g, length_cm, width_cm, height_cm,
            created_at, updated_at
        FROM products
        WHERE owner_id = $1 AND sku = $2
        ",
    )
    .bind(owner_id)
    .bind(sku)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

/// List an owner's products, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_products_by_owner(
    pool: &PgPool,
    owner_id: OwnerId,
) -> Result<Vec<Product>, RepositoryError> {
    let products = sqlx::query_as::<_, Product>(
        r"
        SELECT
            id, owner_id, internal_sku, sku, name, category,
            weight_g, length_cm, width_cm, height_cm,
            created_at, updated_at
        FROM products
        WHERE owner_id = $1
        ORDER BY created_at DESC
        ",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(products)
}

/// Map of marketplace SKU to product ID for one owner's whole catalog.
///
/// The reconciler uses this for O(1) membership tests while walking remote
/// inventory pages.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn sku_index(
    pool: &PgPool,
    owner_id: OwnerId,
) -> Result<HashMap<String, ProductId>, RepositoryError> {
    let rows = sqlx::query_as::<_, (String, ProductId)>(
        r"
        SELECT sku, id
        FROM products
        WHERE owner_id = $1
        ",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Refresh a product's display fields from catalog enrichment.
///
/// Only name and category are touched; user-entered dimensions and SKUs are
/// never overwritten by a sync.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
pub async fn update_product_enrichment(
    pool: &PgPool,
    id: ProductId,
    name: &str,
    category: Option<&str>,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE products
        SET name = $2, category = COALESCE($3, category), updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(id)
    .bind(name)
    .bind(category)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}
