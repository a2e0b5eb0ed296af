//! Application result alias

use super::AppError;

/// Result type for API handlers and services
pub type AppResult<T> = Result<T, AppError>;
