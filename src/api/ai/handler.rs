//! AI narration handler

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

const MAX_PROMPT_LEN: usize = 4000;

#[derive(Debug, Deserialize)]
pub struct GeneratePayload {
    pub prompt: String,
    /// Client-side hint (product description, analytics Q&A, ...), kept
    /// for logging only
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub text: String,
}

/// POST /api/ai/generate
pub async fn generate(
    State(state): State<ServerState>,
    Json(payload): Json<GeneratePayload>,
) -> AppResult<Json<GenerateResponse>> {
    let prompt = payload.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::validation("prompt must not be empty"));
    }
    if prompt.len() > MAX_PROMPT_LEN {
        return Err(AppError::validation("prompt is too long"));
    }

    tracing::debug!(kind = payload.kind.as_deref().unwrap_or("unspecified"), "AI generate");
    let text = state.ai.generate(prompt).await;
    Ok(Json(GenerateResponse { text }))
}
