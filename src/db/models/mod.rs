//! Database models
//!
//! Row-level structs with `FromRow` derives plus the request/response
//! shapes the API layer exposes. Ids are UUIDv4 strings, timestamps are
//! Unix milliseconds.

pub mod order;
pub mod product;
pub mod user;

pub use order::{
    AdminOrderFilter, Order, OrderItem, OrderSearchTerm, OrderSummary, ShippingAddress,
    StatusHistoryEntry,
};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use user::{Address, CartLine, User, UserProfile, UserProfileUpdate};
