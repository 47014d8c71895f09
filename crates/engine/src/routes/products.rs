//! Product catalog and cost ledger handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use sellerglass_core::{OwnerId, ProductId};

use crate::db;
use crate::error::AppError;
use crate::models::cost::{CostVersion, NewCostVersion};
use crate::models::product::{NewProduct, Product};
use crate::state::AppState;

/// Build the product routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", post(create).get(index))
        .route("/products/{id}", get(show))
        .route("/products/{id}/costs", post(create_cost).get(cost_history))
        .route("/products/{id}/costs/current", get(current_cost))
}

/// Query filter for product listing.
#[derive(Debug, Deserialize)]
pub struct OwnerFilter {
    pub owner_id: OwnerId,
}

/// Point-in-time selector for cost resolution.
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    /// Defaults to now.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

/// Create a product by hand.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    if input.sku.trim().is_empty() {
        return Err(AppError::BadRequest("sku must not be empty".to_string()));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }

    let product = db::products::create_product(state.pool(), &input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List one owner's products.
async fn index(
    State(state): State<AppState>,
    Query(filter): Query<OwnerFilter>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = db::products::list_products_by_owner(state.pool(), filter.owner_id).await?;
    Ok(Json(products))
}

/// Fetch a single product.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    let product = db::products::get_product(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

/// Append a cost version to the product's ledger.
///
/// The previously open version is closed where the new one starts; history
/// behind that point is never rewritten.
async fn create_cost(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<NewCostVersion>,
) -> Result<(StatusCode, Json<CostVersion>), AppError> {
    let version = db::costs::create_cost_version(state.pool(), id, &input).await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// Full cost history, newest version first.
async fn cost_history(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<CostVersion>>, AppError> {
    let versions = db::costs::list_cost_versions(state.pool(), id).await?;
    Ok(Json(versions))
}

/// Resolve the cost in effect at a point in time (default: now).
async fn current_cost(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<CostVersion>, AppError> {
    let as_of = query.as_of.unwrap_or_else(Utc::now);
    let version = db::costs::current_cost_version(state.pool(), id, as_of)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no cost version covers {as_of}")))?;
    Ok(Json(version))
}
