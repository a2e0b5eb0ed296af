//! Cart repository
//!
//! One row per (user, product). Checkout-time consumption of the cart is
//! handled transactionally by the order engine.

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::db::models::CartLine;

pub async fn list(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(
        "SELECT c.product_id, c.quantity, p.name, p.price, p.stock, p.unit, p.image_url
         FROM cart_items c
         JOIN products p ON p.id = c.product_id
         WHERE c.user_id = ?
         ORDER BY p.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

/// Add a product to the cart, incrementing the quantity if already present
pub async fn add(
    pool: &SqlitePool,
    user_id: &str,
    product_id: &str,
    quantity: i64,
) -> RepoResult<()> {
    let exists = sqlx::query_scalar::<_, String>("SELECT id FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(RepoError::NotFound(format!("Product not found: {product_id}")));
    }

    sqlx::query(
        "INSERT INTO cart_items (user_id, product_id, quantity) VALUES (?, ?, ?)
         ON CONFLICT (user_id, product_id)
         DO UPDATE SET quantity = quantity + excluded.quantity",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .execute(pool)
    .await?;
    Ok(())
}

/// Set the quantity of an existing cart line. Zero or less removes the line.
pub async fn set_quantity(
    pool: &SqlitePool,
    user_id: &str,
    product_id: &str,
    quantity: i64,
) -> RepoResult<()> {
    if quantity <= 0 {
        return remove(pool, user_id, product_id).await;
    }

    let result =
        sqlx::query("UPDATE cart_items SET quantity = ? WHERE user_id = ? AND product_id = ?")
            .bind(quantity)
            .bind(user_id)
            .bind(product_id)
            .execute(pool)
            .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Cart item not found: {product_id}"
        )));
    }
    Ok(())
}

pub async fn remove(pool: &SqlitePool, user_id: &str, product_id: &str) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ? AND product_id = ?")
        .bind(user_id)
        .bind(product_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Cart item not found: {product_id}"
        )));
    }
    Ok(())
}
