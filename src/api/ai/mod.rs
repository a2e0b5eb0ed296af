//! AI narration routes

use axum::{Router, routing::post};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/ai/generate", post(handler::generate))
}
