//! Cart API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::CartLine;
use crate::db::repository::cart as cart_repo;
use crate::utils::validation::parse_id;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AddToCartPayload {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityPayload {
    pub quantity: i64,
}

/// GET /api/cart
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<CartLine>>> {
    let lines = cart_repo::list(&state.pool, &user.id).await?;
    Ok(Json(lines))
}

/// POST /api/cart - add a product, incrementing if already present
pub async fn add(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AddToCartPayload>,
) -> AppResult<Json<Vec<CartLine>>> {
    let product_id = parse_id(&payload.product_id, "product id")?;
    if payload.quantity <= 0 {
        return Err(AppError::validation("quantity must be positive"));
    }

    cart_repo::add(&state.pool, &user.id, &product_id, payload.quantity).await?;
    let lines = cart_repo::list(&state.pool, &user.id).await?;
    Ok(Json(lines))
}

/// PUT /api/cart/{product_id} - set quantity, zero removes the line
pub async fn set_quantity(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
    Json(payload): Json<SetQuantityPayload>,
) -> AppResult<Json<Vec<CartLine>>> {
    let product_id = parse_id(&product_id, "product id")?;
    cart_repo::set_quantity(&state.pool, &user.id, &product_id, payload.quantity).await?;
    let lines = cart_repo::list(&state.pool, &user.id).await?;
    Ok(Json(lines))
}

/// DELETE /api/cart/{product_id}
pub async fn remove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<Vec<CartLine>>> {
    let product_id = parse_id(&product_id, "product id")?;
    cart_repo::remove(&state.pool, &user.id, &product_id).await?;
    let lines = cart_repo::list(&state.pool, &user.id).await?;
    Ok(Json(lines))
}
