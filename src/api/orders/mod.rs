//! Order API routes (customer-facing)

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", get(handler::list_mine).post(handler::place))
        .route("/api/orders/{id}", get(handler::get_by_id))
        .route("/api/orders/{id}/cancel", put(handler::cancel))
}
