//! Order models
//!
//! An order is assembled from three tables: the order row itself, its
//! immutable item snapshot, and the append-only status history.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::orders::OrderStatus;

/// Delivery address captured at checkout, stored flat on the order row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub name: String,
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

/// Order line snapshot
///
/// Name and unit price are copied from the catalog at placement time and
/// never change afterwards, even if the product is edited or deleted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

/// One entry in the append-only status history
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub reason: String,
    pub updated_by: String,
    pub updated_at: i64,
}

/// Fully assembled order
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub user_reason: String,
    pub admin_reason: String,
    pub status_history: Vec<StatusHistoryEntry>,
    pub created_at: i64,
}

/// Order with customer identity attached, for the admin list view
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub customer_name: String,
    pub customer_email: String,
}

/// Classified admin search term
///
/// The raw `q` string is classified once at the boundary instead of being
/// pattern-matched inside the SQL builder.
#[derive(Debug, Clone)]
pub enum OrderSearchTerm {
    /// Exact order id (the term parses as a UUID)
    OrderId(String),
    /// Exact customer email, case-insensitive (the term contains '@')
    Email(String),
    /// Substring match over customer name and snapshot item names
    Text(String),
}

impl OrderSearchTerm {
    pub fn classify(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if Uuid::parse_str(raw).is_ok() {
            Some(Self::OrderId(raw.to_string()))
        } else if raw.contains('@') {
            Some(Self::Email(raw.to_string()))
        } else {
            Some(Self::Text(raw.to_string()))
        }
    }
}

/// Filters for the admin order listing
#[derive(Debug, Clone, Default)]
pub struct AdminOrderFilter {
    pub status: Option<OrderStatus>,
    /// Inclusive lower bound on created_at, Unix millis
    pub from_millis: Option<i64>,
    /// Exclusive upper bound on created_at, Unix millis
    pub to_millis: Option<i64>,
    pub term: Option<OrderSearchTerm>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_classification() {
        let id = Uuid::new_v4().to_string();
        assert!(matches!(
            OrderSearchTerm::classify(&id),
            Some(OrderSearchTerm::OrderId(_))
        ));
        assert!(matches!(
            OrderSearchTerm::classify("shopper@example.com"),
            Some(OrderSearchTerm::Email(_))
        ));
        assert!(matches!(
            OrderSearchTerm::classify("samosa"),
            Some(OrderSearchTerm::Text(_))
        ));
        assert!(OrderSearchTerm::classify("   ").is_none());
    }
}
