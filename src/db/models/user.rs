//! User model and cart line shapes

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::{AppError, AppResult};

/// Saved delivery address, embedded flat in the users table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub house: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
}

/// User account row
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub contact: String,
    pub is_admin: bool,
    pub house: String,
    pub landmark: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub reset_token: Option<String>,
    pub reset_token_expires: Option<i64>,
    pub created_at: i64,
}

impl User {
    /// Hash a plaintext password with Argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Verify a plaintext password against the stored hash
    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn default_address(&self) -> Address {
        Address {
            house: self.house.clone(),
            landmark: self.landmark.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
        }
    }

    /// Public profile view, never includes the password hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            contact: self.contact.clone(),
            is_admin: self.is_admin,
            default_address: self.default_address(),
            created_at: self.created_at,
        }
    }
}

/// Profile shape returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub contact: String,
    pub is_admin: bool,
    pub default_address: Address,
    pub created_at: i64,
}

/// Partial profile update
#[derive(Debug, Deserialize)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub default_address: Option<Address>,
}

/// Cart line joined with the live product row for display
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub unit: String,
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_hash(hash: String) -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            password_hash: hash,
            name: "Test".to_string(),
            contact: String::new(),
            is_admin: false,
            house: String::new(),
            landmark: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
            reset_token: None,
            reset_token_expires: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = User::hash_password("secret123").unwrap();
        let user = user_with_hash(hash);
        assert!(user.verify_password("secret123"));
        assert!(!user.verify_password("wrong"));
    }

    #[test]
    fn test_verify_with_garbage_hash() {
        let user = user_with_hash("not-a-hash".to_string());
        assert!(!user.verify_password("anything"));
    }
}
