//! Cart API routes

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/cart", get(handler::list).post(handler::add))
        .route(
            "/api/cart/{product_id}",
            put(handler::set_quantity).delete(handler::remove),
        )
}
