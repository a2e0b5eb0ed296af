//! Product API handlers
//!
//! Catalog reads are public; writes are admin-only (enforced by the route
//! layer in `router()`).

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::product as product_repo;
use crate::utils::validation::{MAX_NAME_LEN, parse_id, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/products
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = product_repo::list(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let id = parse_id(&id, "product id")?;
    let product = product_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product not found: {id}")))?;
    Ok(Json(product))
}

/// POST /api/products (admin)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    if payload.price < 0.0 {
        return Err(AppError::validation("price must not be negative"));
    }
    if payload.stock < 0 {
        return Err(AppError::validation("stock must not be negative"));
    }

    let product = product_repo::create(&state.pool, &payload).await?;
    tracing::info!(product_id = %product.id, name = %product.name, "Product created");
    Ok(Json(product))
}

/// PUT /api/products/{id} (admin)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let id = parse_id(&id, "product id")?;
    if let Some(price) = payload.price
        && price < 0.0
    {
        return Err(AppError::validation("price must not be negative"));
    }
    if let Some(stock) = payload.stock
        && stock < 0
    {
        return Err(AppError::validation("stock must not be negative"));
    }

    let product = product_repo::update(&state.pool, &id, &payload).await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} (admin)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let id = parse_id(&id, "product id")?;
    product_repo::delete(&state.pool, &id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(serde_json::json!({ "deleted": id })))
}
