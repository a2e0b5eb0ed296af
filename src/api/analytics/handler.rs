//! Admin analytics handlers
//!
//! Read-only rollups computed straight from SQL. Cancelled orders are
//! excluded from revenue metrics but still appear in the status
//! distribution. Product rollups aggregate over item snapshots, so sales
//! of since-deleted products keep counting under their snapshot name.

use axum::{Json, extract::State};
use serde::Serialize;
use sqlx::FromRow;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult, time::now_millis};

const YEAR_MILLIS: i64 = 365 * 24 * 60 * 60 * 1000;

#[derive(Debug, Serialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CategoryStat {
    pub category: String,
    pub units_sold: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub units_sold: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TopCustomer {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub order_count: i64,
    pub total_spent: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyTrend {
    pub month: String,
    pub order_count: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub total_revenue: f64,
    pub total_orders: i64,
    pub unique_customers: i64,
    pub repeat_customers: i64,
    pub average_order_value: f64,
    pub status_distribution: Vec<StatusCount>,
    pub category_stats: Vec<CategoryStat>,
    pub top_products: Vec<TopProduct>,
    pub top_customers: Vec<TopCustomer>,
    pub monthly_trends: Vec<MonthlyTrend>,
}

#[derive(FromRow)]
struct Totals {
    order_count: i64,
    revenue: f64,
}

/// GET /api/admin/analytics
pub async fn get_analytics(State(state): State<ServerState>) -> AppResult<Json<AnalyticsResponse>> {
    let pool = &state.pool;

    let totals = sqlx::query_as::<_, Totals>(
        "SELECT COUNT(*) AS order_count, COALESCE(SUM(total_amount), 0) AS revenue
         FROM orders WHERE status != 'Cancelled'",
    )
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    let unique_customers = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT user_id) FROM orders WHERE status != 'Cancelled'",
    )
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    let repeat_customers = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM (
             SELECT user_id FROM orders WHERE status != 'Cancelled'
             GROUP BY user_id HAVING COUNT(*) >= 2
         )",
    )
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    let status_distribution = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM orders GROUP BY status ORDER BY count DESC",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    let category_stats = sqlx::query_as::<_, CategoryStat>(
        "SELECT p.category,
                SUM(oi.quantity) AS units_sold,
                SUM(oi.quantity * oi.unit_price) AS revenue
         FROM order_items oi
         JOIN orders o ON o.id = oi.order_id
         JOIN products p ON p.id = oi.product_id
         WHERE o.status != 'Cancelled'
         GROUP BY p.category
         ORDER BY revenue DESC",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    let top_products = sqlx::query_as::<_, TopProduct>(
        "SELECT oi.product_id, oi.name,
                SUM(oi.quantity) AS units_sold,
                SUM(oi.quantity * oi.unit_price) AS revenue
         FROM order_items oi
         JOIN orders o ON o.id = oi.order_id
         WHERE o.status != 'Cancelled'
         GROUP BY oi.product_id, oi.name
         ORDER BY revenue DESC
         LIMIT 10",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    let top_customers = sqlx::query_as::<_, TopCustomer>(
        "SELECT u.id AS user_id, u.name, u.email,
                COUNT(*) AS order_count,
                SUM(o.total_amount) AS total_spent
         FROM orders o
         JOIN users u ON u.id = o.user_id
         WHERE o.status != 'Cancelled'
         GROUP BY u.id, u.name, u.email
         ORDER BY total_spent DESC
         LIMIT 10",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    let cutoff = now_millis() - YEAR_MILLIS;
    let monthly_trends = sqlx::query_as::<_, MonthlyTrend>(
        "SELECT strftime('%Y-%m', datetime(created_at / 1000, 'unixepoch')) AS month,
                COUNT(*) AS order_count,
                COALESCE(SUM(total_amount), 0) AS revenue
         FROM orders
         WHERE status != 'Cancelled' AND created_at >= ?
         GROUP BY month
         ORDER BY month",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    let average_order_value = if totals.order_count > 0 {
        totals.revenue / totals.order_count as f64
    } else {
        0.0
    };

    Ok(Json(AnalyticsResponse {
        total_revenue: totals.revenue,
        total_orders: totals.order_count,
        unique_customers,
        repeat_customers,
        average_order_value,
        status_distribution,
        category_stats,
        top_products,
        top_customers,
        monthly_trends,
    }))
}
