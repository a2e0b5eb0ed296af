//! Order transaction engine
//!
//! All writes that touch stock, orders and the cart go through this module
//! inside a single `BEGIN IMMEDIATE` transaction. IMMEDIATE takes the write
//! lock up front, so concurrent placements serialize their stock checks
//! instead of failing on a snapshot upgrade mid-transaction.

use sqlx::{FromRow, SqliteConnection, SqlitePool};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Order, OrderItem, ShippingAddress};
use crate::db::repository::{self, RepoError};
use crate::orders::OrderStatus;
use crate::utils::{AppError, time::now_millis};

/// Errors from order placement and lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("User not found")]
    UserNotFound,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Not enough stock for {0}")]
    InsufficientStock(String),

    #[error("Product no longer available: {0}")]
    ProductUnavailable(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Not allowed to modify this order")]
    Forbidden,

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Storage(String),
}

impl From<RepoError> for OrderError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => Self::NotFound(msg),
            RepoError::Duplicate(msg) | RepoError::Database(msg) => Self::Storage(msg),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::UserNotFound => AppError::not_found("User not found"),
            OrderError::EmptyCart => AppError::EmptyCart,
            OrderError::InsufficientStock(product) => AppError::InsufficientStock(product),
            OrderError::ProductUnavailable(id) => {
                AppError::validation(format!("Product no longer available: {id}"))
            }
            OrderError::NotFound(msg) => AppError::not_found(msg),
            OrderError::Forbidden => AppError::forbidden("Not allowed to modify this order"),
            OrderError::InvalidTransition(msg) => AppError::InvalidTransition(msg),
            OrderError::Database(e) => AppError::database(e.to_string()),
            OrderError::Storage(msg) => AppError::database(msg),
        }
    }
}

/// Customer-facing cancellation reason
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code", content = "note", rename_all = "snake_case")]
pub enum CancelReason {
    ChangedMind,
    OrderedByMistake,
    DeliveryTooSlow,
    Other(String),
}

impl CancelReason {
    pub fn as_text(&self) -> String {
        match self {
            Self::ChangedMind => "Changed my mind".to_string(),
            Self::OrderedByMistake => "Ordered by mistake".to_string(),
            Self::DeliveryTooSlow => "Delivery was taking too long".to_string(),
            Self::Other(note) => note.clone(),
        }
    }
}

#[derive(FromRow)]
struct CartRow {
    product_id: String,
    quantity: i64,
    name: Option<String>,
    price: Option<f64>,
}

#[derive(FromRow)]
struct OrderHead {
    user_id: String,
    status: OrderStatus,
}

/// Coordinates order placement and lifecycle transitions
#[derive(Clone)]
pub struct OrderEngine {
    pool: SqlitePool,
}

impl OrderEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Place an order from the user's cart, all-or-nothing.
    ///
    /// Validates the user and a non-empty cart, decrements stock with a
    /// guarded update per line, snapshots item names and prices, appends
    /// the initial Placed history entry and clears the cart. Any failure
    /// rolls the whole transaction back, leaving stock and cart untouched.
    pub async fn place_order(
        &self,
        user_id: &str,
        shipping: &ShippingAddress,
    ) -> Result<Order, OrderError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = Self::place_order_tx(&mut conn, user_id, shipping).await;
        let order_id = match result {
            Ok(id) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                id
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(e);
            }
        };
        drop(conn);

        tracing::info!(order_id = %order_id, user_id = %user_id, "Order placed");
        Ok(repository::order::find_by_id(&self.pool, &order_id).await?)
    }

    async fn place_order_tx(
        conn: &mut SqliteConnection,
        user_id: &str,
        shipping: &ShippingAddress,
    ) -> Result<String, OrderError> {
        let user_exists = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;
        if user_exists.is_none() {
            return Err(OrderError::UserNotFound);
        }

        let lines = sqlx::query_as::<_, CartRow>(
            "SELECT c.product_id, c.quantity, p.name, p.price
             FROM cart_items c
             LEFT JOIN products p ON p.id = c.product_id
             WHERE c.user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let now = now_millis();
        let mut total = 0.0_f64;
        let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());

        for line in &lines {
            // a cart line whose product was removed from the catalog
            // aborts the whole placement
            let (Some(name), Some(price)) = (&line.name, line.price) else {
                return Err(OrderError::ProductUnavailable(line.product_id.clone()));
            };

            // guarded decrement: the WHERE clause is the stock check, so
            // check and take happen in one statement
            let updated = sqlx::query(
                "UPDATE products SET stock = stock - ?1, updated_at = ?2
                 WHERE id = ?3 AND stock >= ?1",
            )
            .bind(line.quantity)
            .bind(now)
            .bind(&line.product_id)
            .execute(&mut *conn)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(OrderError::InsufficientStock(name.clone()));
            }

            total += price * line.quantity as f64;
            items.push(OrderItem {
                product_id: line.product_id.clone(),
                name: name.clone(),
                unit_price: price,
                quantity: line.quantity,
            });
        }

        let order_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO orders
                (id, user_id, total_amount, ship_name, ship_house, ship_landmark,
                 ship_address, ship_city, ship_postal, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order_id)
        .bind(user_id)
        .bind(total)
        .bind(&shipping.name)
        .bind(&shipping.house)
        .bind(&shipping.landmark)
        .bind(&shipping.address)
        .bind(&shipping.city)
        .bind(&shipping.postal_code)
        .bind(OrderStatus::Placed.as_str())
        .bind(now)
        .execute(&mut *conn)
        .await?;

        for item in &items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, name, unit_price, quantity)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&order_id)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *conn)
            .await?;
        }

        Self::append_history(&mut *conn, &order_id, OrderStatus::Placed, "", user_id, now).await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        Ok(order_id)
    }

    /// Cancel an order as its owner or as staff.
    ///
    /// Only Placed and Processing orders can be cancelled. Stock is restored
    /// per line on a best-effort basis: lines whose product has since been
    /// deleted are skipped, the cancellation itself still succeeds.
    pub async fn cancel_order(
        &self,
        order_id: &str,
        actor_id: &str,
        is_staff: bool,
        reason: Option<&CancelReason>,
    ) -> Result<Order, OrderError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result =
            Self::cancel_order_tx(&mut conn, order_id, actor_id, is_staff, reason).await;
        match result {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(e);
            }
        }
        drop(conn);

        tracing::info!(order_id = %order_id, actor_id = %actor_id, "Order cancelled");
        Ok(repository::order::find_by_id(&self.pool, order_id).await?)
    }

    async fn cancel_order_tx(
        conn: &mut SqliteConnection,
        order_id: &str,
        actor_id: &str,
        is_staff: bool,
        reason: Option<&CancelReason>,
    ) -> Result<(), OrderError> {
        let head = Self::load_head(&mut *conn, order_id).await?;

        let is_owner = head.user_id == actor_id;
        if !is_owner && !is_staff {
            return Err(OrderError::Forbidden);
        }
        if !head.status.is_cancellable() {
            return Err(OrderError::InvalidTransition(format!(
                "Cannot cancel an order that is {}",
                head.status
            )));
        }

        let now = now_millis();
        Self::restore_stock(&mut *conn, order_id, now).await?;

        // only touch the reason column when a reason was given, so a
        // no-note cancel does not erase a note from an earlier transition
        let reason_text = reason.map(CancelReason::as_text);
        match &reason_text {
            Some(text) => {
                let reason_column = if is_owner { "user_reason" } else { "admin_reason" };
                sqlx::query(&format!(
                    "UPDATE orders SET status = ?, {reason_column} = ? WHERE id = ?"
                ))
                .bind(OrderStatus::Cancelled.as_str())
                .bind(text)
                .bind(order_id)
                .execute(&mut *conn)
                .await?;
            }
            None => {
                sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
                    .bind(OrderStatus::Cancelled.as_str())
                    .bind(order_id)
                    .execute(&mut *conn)
                    .await?;
            }
        }

        Self::append_history(
            &mut *conn,
            order_id,
            OrderStatus::Cancelled,
            reason_text.as_deref().unwrap_or_default(),
            actor_id,
            now,
        )
        .await?;

        Ok(())
    }

    /// Move an order along its lifecycle as staff.
    ///
    /// A move to Cancelled goes through the cancellation path so stock is
    /// restored; every other move is a plain status update plus a history
    /// entry.
    pub async fn update_status(
        &self,
        order_id: &str,
        actor_id: &str,
        new_status: OrderStatus,
        note: Option<&str>,
    ) -> Result<Order, OrderError> {
        if new_status == OrderStatus::Cancelled {
            let reason = note.map(|n| CancelReason::Other(n.to_string()));
            return self
                .cancel_order(order_id, actor_id, true, reason.as_ref())
                .await;
        }

        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result =
            Self::update_status_tx(&mut conn, order_id, actor_id, new_status, note).await;
        match result {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(e);
            }
        }
        drop(conn);

        tracing::info!(order_id = %order_id, status = %new_status, "Order status updated");
        Ok(repository::order::find_by_id(&self.pool, order_id).await?)
    }

    async fn update_status_tx(
        conn: &mut SqliteConnection,
        order_id: &str,
        actor_id: &str,
        new_status: OrderStatus,
        note: Option<&str>,
    ) -> Result<(), OrderError> {
        let head = Self::load_head(&mut *conn, order_id).await?;

        if !head.status.can_transition(new_status, true) {
            return Err(OrderError::InvalidTransition(format!(
                "Cannot move order from {} to {new_status}",
                head.status
            )));
        }

        let now = now_millis();
        let note = note.unwrap_or_default();

        if note.is_empty() {
            sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
                .bind(new_status.as_str())
                .bind(order_id)
                .execute(&mut *conn)
                .await?;
        } else {
            sqlx::query("UPDATE orders SET status = ?, admin_reason = ? WHERE id = ?")
                .bind(new_status.as_str())
                .bind(note)
                .bind(order_id)
                .execute(&mut *conn)
                .await?;
        }

        Self::append_history(&mut *conn, order_id, new_status, note, actor_id, now).await?;
        Ok(())
    }

    async fn load_head(
        conn: &mut SqliteConnection,
        order_id: &str,
    ) -> Result<OrderHead, OrderError> {
        sqlx::query_as::<_, OrderHead>("SELECT user_id, status FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("Order not found: {order_id}")))
    }

    async fn restore_stock(
        conn: &mut SqliteConnection,
        order_id: &str,
        now: i64,
    ) -> Result<(), OrderError> {
        #[derive(FromRow)]
        struct Line {
            product_id: String,
            quantity: i64,
        }

        let lines = sqlx::query_as::<_, Line>(
            "SELECT product_id, quantity FROM order_items WHERE order_id = ?",
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        for line in lines {
            let updated = sqlx::query(
                "UPDATE products SET stock = stock + ?, updated_at = ? WHERE id = ?",
            )
            .bind(line.quantity)
            .bind(now)
            .bind(&line.product_id)
            .execute(&mut *conn)
            .await?;

            if updated.rows_affected() == 0 {
                tracing::debug!(
                    product_id = %line.product_id,
                    "Skipping stock restore for removed product"
                );
            }
        }
        Ok(())
    }

    async fn append_history(
        conn: &mut SqliteConnection,
        order_id: &str,
        status: OrderStatus,
        reason: &str,
        updated_by: &str,
        updated_at: i64,
    ) -> Result<(), OrderError> {
        sqlx::query(
            "INSERT INTO order_status_history (order_id, status, reason, updated_by, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(status.as_str())
        .bind(reason)
        .bind(updated_by)
        .bind(updated_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_reason_text() {
        assert_eq!(CancelReason::ChangedMind.as_text(), "Changed my mind");
        assert_eq!(
            CancelReason::Other("moved house".to_string()).as_text(),
            "moved house"
        );
    }

    #[test]
    fn test_cancel_reason_wire_format() {
        let json = r#"{"code":"changed_mind"}"#;
        let reason: CancelReason = serde_json::from_str(json).unwrap();
        assert!(matches!(reason, CancelReason::ChangedMind));

        let json = r#"{"code":"other","note":"found it cheaper"}"#;
        let reason: CancelReason = serde_json::from_str(json).unwrap();
        assert_eq!(reason.as_text(), "found it cheaper");
    }
}
