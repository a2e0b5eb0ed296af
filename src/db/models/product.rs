//! Product catalog model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Catalog product row
///
/// `keywords` is stored as a JSON array in a TEXT column.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub unit: String,
    pub quantity_value: f64,
    pub category: String,
    pub keywords: Json<Vec<String>>,
    pub image_url: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Payload for creating a product (admin)
#[derive(Debug, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub stock: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub quantity_value: f64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub image_url: String,
}

fn default_unit() -> String {
    "gm".to_string()
}

fn default_category() -> String {
    "General".to_string()
}

/// Partial product update (admin), absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub unit: Option<String>,
    pub quantity_value: Option<f64>,
    pub category: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub image_url: Option<String>,
}
