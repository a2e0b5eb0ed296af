//! Admin analytics routes

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/analytics", get(handler::get_analytics))
        .route_layer(middleware::from_fn(require_admin))
}
