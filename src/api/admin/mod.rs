//! Admin API routes

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/orders", get(handler::list_orders))
        .route("/api/admin/orders/{id}", put(handler::update_status))
        .route_layer(middleware::from_fn(require_admin))
}
