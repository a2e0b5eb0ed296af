//! Product repository

use sqlx::SqlitePool;
use uuid::Uuid;

use super::{RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::utils::time::now_millis;

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let products =
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY category, name")
            .fetch_all(pool)
            .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

pub async fn create(pool: &SqlitePool, payload: &ProductCreate) -> RepoResult<Product> {
    let id = Uuid::new_v4().to_string();
    let now = now_millis();
    let keywords = serde_json::to_string(&payload.keywords)
        .map_err(|e| RepoError::Database(format!("Failed to encode keywords: {e}")))?;

    sqlx::query(
        "INSERT INTO products
            (id, name, description, price, stock, unit, quantity_value, category,
             keywords, image_url, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.stock)
    .bind(&payload.unit)
    .bind(payload.quantity_value)
    .bind(&payload.category)
    .bind(&keywords)
    .bind(&payload.image_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Product not found after insert".to_string()))
}

/// Apply a partial update, absent fields stay unchanged
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    update: &ProductUpdate,
) -> RepoResult<Product> {
    let keywords = match &update.keywords {
        Some(list) => Some(
            serde_json::to_string(list)
                .map_err(|e| RepoError::Database(format!("Failed to encode keywords: {e}")))?,
        ),
        None => None,
    };

    let result = sqlx::query(
        "UPDATE products SET
            name           = COALESCE(?, name),
            description    = COALESCE(?, description),
            price          = COALESCE(?, price),
            stock          = COALESCE(?, stock),
            unit           = COALESCE(?, unit),
            quantity_value = COALESCE(?, quantity_value),
            category       = COALESCE(?, category),
            keywords       = COALESCE(?, keywords),
            image_url      = COALESCE(?, image_url),
            updated_at     = ?
         WHERE id = ?",
    )
    .bind(update.name.as_deref())
    .bind(update.description.as_deref())
    .bind(update.price)
    .bind(update.stock)
    .bind(update.unit.as_deref())
    .bind(update.quantity_value)
    .bind(update.category.as_deref())
    .bind(keywords.as_deref())
    .bind(update.image_url.as_deref())
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product not found: {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product not found: {id}")))
}

/// Delete a product from the catalog.
///
/// Existing order item snapshots keep their copied name and price; cart
/// lines referencing the product are removed so they cannot block checkout.
pub async fn delete(pool: &SqlitePool, id: &str) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product not found: {id}")));
    }

    sqlx::query("DELETE FROM cart_items WHERE product_id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
