//! Auth API handlers

use axum::{Json, extract::State};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{User, UserProfile, UserProfileUpdate};
use crate::db::repository::user as user_repo;
use crate::security_log;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, time::now_millis};

/// Every failed login takes the same fixed time, so response timing does
/// not reveal whether the email exists.
const LOGIN_DELAY: Duration = Duration::from_millis(500);

/// Reset tokens live for one hour
const RESET_TOKEN_TTL_MILLIS: i64 = 60 * 60 * 1000;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordPayload {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordPayload {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<Json<AuthResponse>> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let hash = User::hash_password(&payload.password)?;
    let user = user_repo::create(
        &state.pool,
        payload.email.trim(),
        &hash,
        payload.name.trim(),
        payload.contact.trim(),
    )
    .await?;

    let token = state
        .jwt_service
        .generate_token(&user.id, &user.email, &user.name, user.is_admin)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<AuthResponse>> {
    tokio::time::sleep(LOGIN_DELAY).await;

    let user = user_repo::find_by_email(&state.pool, &payload.email).await?;
    let Some(user) = user else {
        security_log!("WARN", "login_failed", email = payload.email.clone());
        return Err(AppError::invalid_credentials());
    };

    if !user.verify_password(&payload.password) {
        security_log!("WARN", "login_failed", email = payload.email.clone());
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(&user.id, &user.email, &user.name, user.is_admin)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let user = user_repo::find_by_id(&state.pool, &current.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user.profile()))
}

/// PUT /api/auth/me
pub async fn update_me(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<UserProfileUpdate>,
) -> AppResult<Json<UserProfile>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.contact, "contact", MAX_NAME_LEN)?;
    if let Some(addr) = &payload.default_address {
        validate_required_text(&addr.address, "address", MAX_ADDRESS_LEN)?;
    }

    let user = user_repo::update_profile(&state.pool, &current.id, &payload).await?;
    Ok(Json(user.profile()))
}

/// POST /api/auth/forgot-password
///
/// Always answers with the same message so the endpoint cannot be used to
/// probe which emails are registered.
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> AppResult<Json<MessageResponse>> {
    if let Some(user) = user_repo::find_by_email(&state.pool, &payload.email).await? {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        let expires = now_millis() + RESET_TOKEN_TTL_MILLIS;

        user_repo::set_reset_token(&state.pool, &user.id, &token, expires).await?;
        state.mailer.send_password_reset(&user.email, &token);
    }

    Ok(Json(MessageResponse {
        message: "If that email is registered, a reset link has been sent".to_string(),
    }))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<ServerState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> AppResult<Json<MessageResponse>> {
    validate_password(&payload.password)?;

    let user = user_repo::find_by_valid_reset_token(&state.pool, &payload.token, now_millis())
        .await?
        .ok_or_else(|| AppError::invalid("Invalid or expired reset token"))?;

    let hash = User::hash_password(&payload.password)?;
    user_repo::update_password(&state.pool, &user.id, &hash).await?;

    security_log!("INFO", "password_reset", user_id = user.id.clone());
    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}
