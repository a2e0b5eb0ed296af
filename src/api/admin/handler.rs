//! Admin order management handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{AdminOrderFilter, Order, OrderSearchTerm, OrderSummary};
use crate::db::repository::order as order_repo;
use crate::orders::OrderStatus;
use crate::utils::time::{day_end_millis, day_start_millis, parse_date};
use crate::utils::validation::{MAX_NOTE_LEN, parse_id, validate_optional_text};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AdminOrderQuery {
    /// Exact status filter
    pub status: Option<String>,
    /// Inclusive start date, YYYY-MM-DD
    pub from: Option<String>,
    /// Inclusive end date, YYYY-MM-DD
    pub to: Option<String>,
    /// Search term: order id, email or free text
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
    /// Optional staff note, recorded as the admin reason
    pub reason: Option<String>,
}

/// GET /api/admin/orders
pub async fn list_orders(
    State(state): State<ServerState>,
    Query(query): Query<AdminOrderQuery>,
) -> AppResult<Json<Vec<OrderSummary>>> {
    let status = match &query.status {
        Some(raw) => Some(
            OrderStatus::parse(raw)
                .ok_or_else(|| AppError::validation(format!("Unknown status: {raw}")))?,
        ),
        None => None,
    };
    let from_millis = match &query.from {
        Some(raw) => Some(day_start_millis(parse_date(raw)?)),
        None => None,
    };
    let to_millis = match &query.to {
        Some(raw) => Some(day_end_millis(parse_date(raw)?)),
        None => None,
    };

    let filter = AdminOrderFilter {
        status,
        from_millis,
        to_millis,
        term: query.q.as_deref().and_then(OrderSearchTerm::classify),
    };

    let orders = order_repo::admin_list(&state.pool, &filter).await?;
    Ok(Json(orders))
}

/// PUT /api/admin/orders/{id} - move an order along its lifecycle
pub async fn update_status(
    State(state): State<ServerState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusPayload>,
) -> AppResult<Json<Order>> {
    let id = parse_id(&id, "order id")?;
    let status = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::validation(format!("Unknown status: {}", payload.status)))?;
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let order = state
        .engine()
        .update_status(&id, &admin.id, status, payload.reason.as_deref())
        .await?;
    Ok(Json(order))
}
