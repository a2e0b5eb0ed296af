//! Product API routes

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    let public = Router::new()
        .route("/api/products", get(handler::list))
        .route("/api/products/{id}", get(handler::get_by_id));

    let admin = Router::new()
        .route("/api/products", post(handler::create))
        .route(
            "/api/products/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .route_layer(middleware::from_fn(require_admin));

    public.merge(admin)
}
