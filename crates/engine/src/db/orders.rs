//! Database operations for ingested sales orders.

use sqlx::{PgConnection, PgPool};

use sellerglass_core::{AccountId, OrderId};

use super::RepositoryError;
use crate::models::order::{NewSalesOrder, NewSalesOrderItem, SalesOrder, SalesOrderItem};

/// Insert an order if it has not been ingested yet.
///
/// `(account_id, amazon_order_id)` is the idempotency key: on conflict
/// nothing is written and `None` is returned, which the ingester reads as
/// "already processed". Runs on a transaction connection so the header and
/// its line items commit together; a header without items never becomes
/// visible.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    input: &NewSalesOrder,
) -> Result<Option<SalesOrder>, RepositoryError> {
    let order = sqlx::query_as::<_, SalesOrder>(
        r"
        INSERT INTO sales_orders (
            account_id, amazon_order_id, marketplace_id,
            purchase_date, order_status, order_total, currency
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (account_id, amazon_order_id) DO NOTHING
        RETURNING
            id, account_id, amazon_order_id, marketplace_id,
            purchase_date, order_status, order_total, currency, created_at
        ",
    )
    .bind(input.account_id)
    .bind(&input.amazon_order_id)
    .bind(&input.marketplace_id)
    .bind(input.purchase_date)
    .bind(&input.order_status)
    .bind(input.order_total)
    .bind(&input.currency)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(order)
}

/// Insert the line items of a freshly ingested order, on the same
/// transaction that inserted the header.
///
/// Items are keyed by `(order_id, order_item_id)`; a duplicate item id in
/// the payload is skipped rather than failing the whole order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn insert_order_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    items: &[NewSalesOrderItem],
) -> Result<(), RepositoryError> {
    for item in items {
        sqlx::query(
            r"
            INSERT INTO sales_order_items (
                order_id, order_item_id, asin, seller_sku, title,
                quantity, unit_price, item_total, currency
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (order_id, order_item_id) DO NOTHING
            ",
        )
        .bind(order_id)
        .bind(&item.order_item_id)
        .bind(&item.asin)
        .bind(&item.seller_sku)
        .bind(&item.title)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.item_total)
        .bind(&item.currency)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// One ingested order, scoped to its account.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_order(
    pool: &PgPool,
    account_id: AccountId,
    order_id: OrderId,
) -> Result<Option<SalesOrder>, RepositoryError> {
    let order = sqlx::query_as::<_, SalesOrder>(
        r"
        SELECT
            id, account_id, amazon_order_id, marketplace_id,
            purchase_date, order_status, order_total, currency, created_at
        FROM sales_orders
        WHERE id = $2 AND account_id = $1
        ",
    )
    .bind(account_id)
    .bind(order_id)
    .fetch_optional(pool)
    .await?;

    Ok(order)
}

/// All orders ingested for an account, newest purchase first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_orders_by_account(
    pool: &PgPool,
    account_id: AccountId,
) -> Result<Vec<SalesOrder>, RepositoryError> {
    let orders = sqlx::query_as::<_, SalesOrder>(
        r"
        SELECT
            id, account_id, amazon_order_id, marketplace_id,
            purchase_date, order_status, order_total, currency, created_at
        FROM sales_orders
        WHERE account_id = $1
        ORDER BY purchase_date DESC
        ",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

/// Line items of one ingested order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_order_items(
    pool: &PgPool,
    order_id: OrderId,
) -> Result<Vec<SalesOrderItem>, RepositoryError> {
    let items = sqlx::query_as::<_, SalesOrderItem>(
        r"
        SELECT
            id, order_id, order_item_id, asin, seller_sku, title,
            quantity, unit_price, item_total, currency, created_at
        FROM sales_order_items
        WHERE order_id = $1
        ORDER BY order_item_id ASC
        ",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}
