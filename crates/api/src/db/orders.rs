//! Order repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgExecutor;

use bazaar_core::{CategoryId, OrderId, OrderItemId, OrderStatus, OrderTotals, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderItemDetail};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    status: i32,
    order_date: DateTime<Utc>,
    order_change_date: Option<DateTime<Utc>>,
    subtotal: Decimal,
    tax: Decimal,
    shipping: Decimal,
    total: Decimal,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_i32(row.status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "invalid order status in database: {}",
                row.status
            ))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            status,
            order_date: row.order_date,
            order_change_date: row.order_change_date,
            subtotal: row.subtotal,
            tax: row.tax,
            shipping: row.shipping,
            total: row.total,
        })
    }
}

const ORDER_COLUMNS: &str =
    "id, user_id, status, order_date, order_change_date, subtotal, tax, shipping, total";

/// Create an order row (status active, change date null).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
    totals: OrderTotals,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "INSERT INTO orders (user_id, status, subtotal, tax, shipping, total) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(user_id.as_i32())
    .bind(OrderStatus::Active.as_i32())
    .bind(totals.subtotal)
    .bind(totals.tax)
    .bind(totals.shipping)
    .bind(totals.total)
    .fetch_one(executor)
    .await?;

    row.try_into()
}

/// Insert a line item with its price snapshot.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_item(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    unit_price: Decimal,
) -> Result<OrderItem, RepositoryError> {
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO order_items (order_id, product_id, quantity, current_unit_price) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(order_id.as_i32())
    .bind(product_id.as_i32())
    .bind(quantity)
    .bind(unit_price)
    .fetch_one(executor)
    .await?;

    Ok(OrderItem {
        id: OrderItemId::new(id),
        order_id,
        product_id,
        quantity,
        current_unit_price: unit_price,
    })
}

/// Get an order by (id, owning user). Cross-user lookups come back as
/// `None`, indistinguishable from a missing order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_for_user(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
    user_id: UserId,
) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
    ))
    .bind(order_id.as_i32())
    .bind(user_id.as_i32())
    .fetch_optional(executor)
    .await?;

    row.map(TryInto::try_into).transpose()
}

/// All orders owned by a user, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if a status value is invalid.
pub async fn list_for_user(
    executor: impl PgExecutor<'_>,
    user_id: UserId,
) -> Result<Vec<Order>, RepositoryError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY id"
    ))
    .bind(user_id.as_i32())
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

#[derive(Debug, sqlx::FromRow)]
struct ItemDetailRow {
    order_id: i32,
    product_id: i32,
    name: String,
    description: Option<String>,
    image_path: Option<String>,
    rating: Option<Decimal>,
    unit_price: Decimal,
    quantity: i32,
}

/// Line items for a set of orders, joined with product details.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn items_for_orders(
    executor: impl PgExecutor<'_>,
    order_ids: &[i32],
) -> Result<Vec<OrderItemDetail>, RepositoryError> {
    let rows = sqlx::query_as::<_, ItemDetailRow>(
        "SELECT oi.order_id, oi.product_id, p.name, p.description, p.image_path, \
         p.rating, oi.current_unit_price AS unit_price, oi.quantity \
         FROM order_items oi JOIN products p ON p.id = oi.product_id \
         WHERE oi.order_id = ANY($1) ORDER BY oi.id",
    )
    .bind(order_ids)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| OrderItemDetail {
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            name: row.name,
            description: row.description,
            image_path: row.image_path,
            rating: row.rating,
            unit_price: row.unit_price,
            quantity: row.quantity,
        })
        .collect())
}

/// Whether any order item references the product.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn references_product(
    executor: impl PgExecutor<'_>,
    product_id: ProductId,
) -> Result<bool, RepositoryError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM order_items WHERE product_id = $1)",
    )
    .bind(product_id.as_i32())
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// Whether any order item references a product in the category.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn references_category(
    executor: impl PgExecutor<'_>,
    category_id: CategoryId,
) -> Result<bool, RepositoryError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM order_items oi \
         JOIN products p ON p.id = oi.product_id WHERE p.category_id = $1)",
    )
    .bind(category_id.as_i32())
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

/// Set an order's status and change date.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order doesn't exist.
pub async fn set_status(
    executor: impl PgExecutor<'_>,
    order_id: OrderId,
    status: OrderStatus,
    change_date: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE orders SET status = $1, order_change_date = $2 WHERE id = $3",
    )
    .bind(status.as_i32())
    .bind(change_date)
    .bind(order_id.as_i32())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}
