//! Order repository (reads)
//!
//! Orders are assembled from three tables. Writes go through the order
//! engine so they stay inside one transaction.

use sqlx::{FromRow, SqlitePool};

use super::{RepoError, RepoResult};
use crate::db::models::{
    AdminOrderFilter, Order, OrderItem, OrderSearchTerm, OrderSummary, ShippingAddress,
    StatusHistoryEntry,
};
use crate::orders::OrderStatus;

#[derive(FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    total_amount: f64,
    ship_name: String,
    ship_house: String,
    ship_landmark: String,
    ship_address: String,
    ship_city: String,
    ship_postal: String,
    status: OrderStatus,
    user_reason: String,
    admin_reason: String,
    created_at: i64,
}

#[derive(FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_name: String,
    customer_email: String,
}

async fn assemble(pool: &SqlitePool, row: OrderRow) -> RepoResult<Order> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT product_id, name, unit_price, quantity
         FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(&row.id)
    .fetch_all(pool)
    .await?;

    let status_history = sqlx::query_as::<_, StatusHistoryEntry>(
        "SELECT status, reason, updated_by, updated_at
         FROM order_status_history WHERE order_id = ? ORDER BY id",
    )
    .bind(&row.id)
    .fetch_all(pool)
    .await?;

    Ok(Order {
        id: row.id,
        user_id: row.user_id,
        items,
        total_amount: row.total_amount,
        shipping_address: ShippingAddress {
            name: row.ship_name,
            house: row.ship_house,
            landmark: row.ship_landmark,
            address: row.ship_address,
            city: row.ship_city,
            postal_code: row.ship_postal,
        },
        status: row.status,
        user_reason: row.user_reason,
        admin_reason: row.admin_reason,
        status_history,
        created_at: row.created_at,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Order> {
    let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order not found: {id}")))?;
    assemble(pool, row).await
}

/// All orders of one user, newest first
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(assemble(pool, row).await?);
    }
    Ok(orders)
}

/// Filtered admin listing, newest first.
///
/// The WHERE clause is built from the typed filter; the search term has
/// already been classified, so each variant maps to exactly one predicate.
pub async fn admin_list(
    pool: &SqlitePool,
    filter: &AdminOrderFilter,
) -> RepoResult<Vec<OrderSummary>> {
    let mut sql = String::from(
        "SELECT o.*, u.name AS customer_name, u.email AS customer_email
         FROM orders o
         JOIN users u ON u.id = o.user_id
         WHERE 1 = 1",
    );
    if filter.status.is_some() {
        sql.push_str(" AND o.status = ?");
    }
    if filter.from_millis.is_some() {
        sql.push_str(" AND o.created_at >= ?");
    }
    if filter.to_millis.is_some() {
        sql.push_str(" AND o.created_at < ?");
    }
    match &filter.term {
        Some(OrderSearchTerm::OrderId(_)) => sql.push_str(" AND o.id = ?"),
        Some(OrderSearchTerm::Email(_)) => sql.push_str(" AND u.email = ? COLLATE NOCASE"),
        Some(OrderSearchTerm::Text(_)) => sql.push_str(
            " AND (u.name LIKE ? OR EXISTS (
                 SELECT 1 FROM order_items oi
                 WHERE oi.order_id = o.id AND oi.name LIKE ?))",
        ),
        None => {}
    }
    sql.push_str(" ORDER BY o.created_at DESC, o.id");

    let mut query = sqlx::query_as::<_, AdminOrderRow>(&sql);
    if let Some(status) = filter.status {
        query = query.bind(status.as_str());
    }
    if let Some(from) = filter.from_millis {
        query = query.bind(from);
    }
    if let Some(to) = filter.to_millis {
        query = query.bind(to);
    }
    match &filter.term {
        Some(OrderSearchTerm::OrderId(id)) => query = query.bind(id.clone()),
        Some(OrderSearchTerm::Email(email)) => query = query.bind(email.clone()),
        Some(OrderSearchTerm::Text(text)) => {
            let pattern = format!("%{text}%");
            query = query.bind(pattern.clone()).bind(pattern);
        }
        None => {}
    }

    let rows = query.fetch_all(pool).await?;
    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        summaries.push(OrderSummary {
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            order: assemble(pool, row.order).await?,
        });
    }
    Ok(summaries)
}
