//! User repository

use sqlx::SqlitePool;
use uuid::Uuid;

use super::{RepoError, RepoResult};
use crate::db::models::{User, UserProfileUpdate};
use crate::utils::time::now_millis;

pub async fn create(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    name: &str,
    contact: &str,
) -> RepoResult<User> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, contact, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(contact)
    .bind(now_millis())
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate("Email already registered".to_string()),
        other => other,
    })?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::NotFound("User not found after insert".to_string()))
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? COLLATE NOCASE")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Apply a partial profile update, absent fields stay unchanged
pub async fn update_profile(
    pool: &SqlitePool,
    id: &str,
    update: &UserProfileUpdate,
) -> RepoResult<User> {
    let address = update.default_address.as_ref();
    let result = sqlx::query(
        "UPDATE users SET
            name        = COALESCE(?, name),
            contact     = COALESCE(?, contact),
            house       = COALESCE(?, house),
            landmark    = COALESCE(?, landmark),
            address     = COALESCE(?, address),
            city        = COALESCE(?, city),
            postal_code = COALESCE(?, postal_code)
         WHERE id = ?",
    )
    .bind(update.name.as_deref())
    .bind(update.contact.as_deref())
    .bind(address.map(|a| a.house.as_str()))
    .bind(address.map(|a| a.landmark.as_str()))
    .bind(address.map(|a| a.address.as_str()))
    .bind(address.map(|a| a.city.as_str()))
    .bind(address.map(|a| a.postal_code.as_str()))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User not found: {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User not found: {id}")))
}

pub async fn set_reset_token(
    pool: &SqlitePool,
    user_id: &str,
    token: &str,
    expires_at: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE users SET reset_token = ?, reset_token_expires = ? WHERE id = ?")
        .bind(token)
        .bind(expires_at)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Find a user by an unexpired reset token
pub async fn find_by_valid_reset_token(
    pool: &SqlitePool,
    token: &str,
    now: i64,
) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE reset_token = ? AND reset_token_expires > ?",
    )
    .bind(token)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Set a new password hash and consume the reset token
pub async fn update_password(pool: &SqlitePool, user_id: &str, hash: &str) -> RepoResult<()> {
    sqlx::query(
        "UPDATE users SET password_hash = ?, reset_token = NULL, reset_token_expires = NULL
         WHERE id = ?",
    )
    .bind(hash)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}
