//! Swaad Sagar storefront server
//!
//! Online snack storefront backend: catalog, carts, atomic checkout with
//! inventory reservation, an order lifecycle state machine, admin order
//! management and analytics.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod utils;

pub use utils::{AppError, AppResult};

/// Structured security event logging
///
/// ```ignore
/// security_log!("WARN", "login_failed", email = email.clone());
/// ```
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(
            target: "security",
            security_level = $level,
            event = $event
            $(, $key = %$value)*
        );
    };
}
