//! Order API handlers (customer-facing)

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, ShippingAddress};
use crate::db::repository::order as order_repo;
use crate::orders::CancelReason;
use crate::utils::validation::{MAX_ADDRESS_LEN, MAX_NOTE_LEN, parse_id, validate_required_text};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct PlaceOrderPayload {
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderPayload {
    pub reason: Option<CancelReason>,
}

/// POST /api/orders - place an order from the cart
pub async fn place(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PlaceOrderPayload>,
) -> AppResult<Json<Order>> {
    let addr = &payload.shipping_address;
    validate_required_text(&addr.address, "shipping address", MAX_ADDRESS_LEN)?;

    let order = state.engine().place_order(&user.id, addr).await?;
    Ok(Json(order))
}

/// GET /api/orders - own orders, newest first
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_repo::list_for_user(&state.pool, &user.id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - one order, owner or admin only
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let id = parse_id(&id, "order id")?;
    let order = order_repo::find_by_id(&state.pool, &id).await?;
    if order.user_id != user.id && !user.is_admin {
        return Err(AppError::forbidden("Not allowed to view this order"));
    }
    Ok(Json(order))
}

/// PUT /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CancelOrderPayload>,
) -> AppResult<Json<Order>> {
    let id = parse_id(&id, "order id")?;
    if let Some(CancelReason::Other(note)) = &payload.reason
        && note.len() > MAX_NOTE_LEN
    {
        return Err(AppError::validation("cancellation note is too long"));
    }

    let order = state
        .engine()
        .cancel_order(&id, &user.id, user.is_admin, payload.reason.as_ref())
        .await?;
    Ok(Json(order))
}
