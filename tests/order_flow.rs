//! End-to-end order flow tests against a real SQLite database.

use sqlx::SqlitePool;
use tempfile::TempDir;

use swaad_server::db::DbService;
use swaad_server::db::models::{AdminOrderFilter, OrderSearchTerm, ProductCreate, ShippingAddress};
use swaad_server::db::repository::{cart as cart_repo, order as order_repo, product as product_repo, user as user_repo};
use swaad_server::orders::{CancelReason, OrderEngine, OrderError, OrderStatus};

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("test.db");
    let db = DbService::new(path.to_str().unwrap()).await.expect("open db");
    (dir, db.pool)
}

async fn seed_user(pool: &SqlitePool, email: &str) -> String {
    // password hash is irrelevant for engine tests
    let user = user_repo::create(pool, email, "x", "Test Shopper", "")
        .await
        .expect("create user");
    user.id
}

async fn seed_product(pool: &SqlitePool, name: &str, price: f64, stock: i64) -> String {
    let product = product_repo::create(
        pool,
        &ProductCreate {
            name: name.to_string(),
            description: String::new(),
            price,
            stock,
            unit: "gm".to_string(),
            quantity_value: 250.0,
            category: "Snacks".to_string(),
            keywords: vec![],
            image_url: String::new(),
        },
    )
    .await
    .expect("create product");
    product.id
}

async fn stock_of(pool: &SqlitePool, product_id: &str) -> i64 {
    product_repo::find_by_id(pool, product_id)
        .await
        .expect("find product")
        .expect("product exists")
        .stock
}

fn shipping() -> ShippingAddress {
    ShippingAddress {
        name: "Test Shopper".to_string(),
        house: "12".to_string(),
        landmark: String::new(),
        address: "MG Road".to_string(),
        city: "Pune".to_string(),
        postal_code: "411001".to_string(),
    }
}

#[tokio::test]
async fn place_order_snapshots_items_and_clears_cart() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;
    let samosa = seed_product(&pool, "Samosa", 15.0, 10).await;
    let chakli = seed_product(&pool, "Chakli", 5.0, 5).await;

    cart_repo::add(&pool, &user, &samosa, 2).await.unwrap();
    cart_repo::add(&pool, &user, &chakli, 3).await.unwrap();

    let engine = OrderEngine::new(pool.clone());
    let order = engine.place_order(&user, &shipping()).await.unwrap();

    assert_eq!(order.total_amount, 45.0);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.status, OrderStatus::Placed);
    assert_eq!(order.shipping_address.city, "Pune");

    // initial history entry is written at placement
    assert_eq!(order.status_history.len(), 1);
    assert_eq!(order.status_history[0].status, OrderStatus::Placed);

    assert_eq!(stock_of(&pool, &samosa).await, 8);
    assert_eq!(stock_of(&pool, &chakli).await, 2);

    let cart = cart_repo::list(&pool, &user).await.unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn place_order_with_empty_cart_fails() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;

    let engine = OrderEngine::new(pool.clone());
    let err = engine.place_order(&user, &shipping()).await.unwrap_err();
    assert!(matches!(err, OrderError::EmptyCart));

    let orders = order_repo::list_for_user(&pool, &user).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;
    let plenty = seed_product(&pool, "Banana Chips", 20.0, 50).await;
    let scarce = seed_product(&pool, "Kaju Katli", 80.0, 1).await;

    cart_repo::add(&pool, &user, &plenty, 5).await.unwrap();
    cart_repo::add(&pool, &user, &scarce, 2).await.unwrap();

    let engine = OrderEngine::new(pool.clone());
    let err = engine.place_order(&user, &shipping()).await.unwrap_err();
    match err {
        OrderError::InsufficientStock(name) => assert_eq!(name, "Kaju Katli"),
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // nothing moved: the earlier decrement was rolled back with the rest
    assert_eq!(stock_of(&pool, &plenty).await, 50);
    assert_eq!(stock_of(&pool, &scarce).await, 1);

    let cart = cart_repo::list(&pool, &user).await.unwrap();
    assert_eq!(cart.len(), 2);

    let orders = order_repo::list_for_user(&pool, &user).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn order_snapshot_survives_catalog_edits() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;
    let samosa = seed_product(&pool, "Samosa", 15.0, 10).await;

    cart_repo::add(&pool, &user, &samosa, 2).await.unwrap();
    let engine = OrderEngine::new(pool.clone());
    let order = engine.place_order(&user, &shipping()).await.unwrap();

    // reprice and rename after the sale
    product_repo::update(
        &pool,
        &samosa,
        &swaad_server::db::models::ProductUpdate {
            name: Some("Jumbo Samosa".to_string()),
            price: Some(99.0),
            description: None,
            stock: None,
            unit: None,
            quantity_value: None,
            category: None,
            keywords: None,
            image_url: None,
        },
    )
    .await
    .unwrap();

    let reloaded = order_repo::find_by_id(&pool, &order.id).await.unwrap();
    assert_eq!(reloaded.total_amount, 30.0);
    assert_eq!(reloaded.items[0].name, "Samosa");
    assert_eq!(reloaded.items[0].unit_price, 15.0);
}

#[tokio::test]
async fn cancel_restores_stock_and_records_reason() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;
    let samosa = seed_product(&pool, "Samosa", 15.0, 5).await;

    cart_repo::add(&pool, &user, &samosa, 2).await.unwrap();
    let engine = OrderEngine::new(pool.clone());
    let order = engine.place_order(&user, &shipping()).await.unwrap();
    assert_eq!(stock_of(&pool, &samosa).await, 3);

    let cancelled = engine
        .cancel_order(&order.id, &user, false, Some(&CancelReason::ChangedMind))
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.user_reason, "Changed my mind");
    assert!(cancelled.admin_reason.is_empty());
    assert_eq!(stock_of(&pool, &samosa).await, 5);

    let statuses: Vec<_> = cancelled.status_history.iter().map(|h| h.status).collect();
    assert_eq!(statuses, vec![OrderStatus::Placed, OrderStatus::Cancelled]);
}

#[tokio::test]
async fn cancel_without_note_keeps_prior_admin_note() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;
    let admin = seed_user(&pool, "admin@example.com").await;
    let samosa = seed_product(&pool, "Samosa", 15.0, 5).await;

    cart_repo::add(&pool, &user, &samosa, 1).await.unwrap();
    let engine = OrderEngine::new(pool.clone());
    let order = engine.place_order(&user, &shipping()).await.unwrap();

    engine
        .update_status(&order.id, &admin, OrderStatus::Processing, Some("packed by team A"))
        .await
        .unwrap();

    // staff cancel with no note must not wipe the earlier note
    let cancelled = engine
        .update_status(&order.id, &admin, OrderStatus::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.admin_reason, "packed by team A");

    // the history entry for the cancel itself has no reason
    let last = cancelled.status_history.last().unwrap();
    assert_eq!(last.status, OrderStatus::Cancelled);
    assert!(last.reason.is_empty());
}

#[tokio::test]
async fn cancel_restores_stock_from_zero() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;
    let laddoo = seed_product(&pool, "Laddoo", 25.0, 1).await;

    cart_repo::add(&pool, &user, &laddoo, 1).await.unwrap();
    let engine = OrderEngine::new(pool.clone());
    let order = engine.place_order(&user, &shipping()).await.unwrap();
    assert_eq!(stock_of(&pool, &laddoo).await, 0);

    engine.cancel_order(&order.id, &user, false, None).await.unwrap();
    assert_eq!(stock_of(&pool, &laddoo).await, 1);
}

#[tokio::test]
async fn cancel_skips_restore_for_deleted_products() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;
    let samosa = seed_product(&pool, "Samosa", 15.0, 5).await;

    cart_repo::add(&pool, &user, &samosa, 1).await.unwrap();
    let engine = OrderEngine::new(pool.clone());
    let order = engine.place_order(&user, &shipping()).await.unwrap();

    product_repo::delete(&pool, &samosa).await.unwrap();

    // cancellation still succeeds, the missing line is skipped
    let cancelled = engine.cancel_order(&order.id, &user, false, None).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn strangers_cannot_cancel_other_peoples_orders() {
    let (_dir, pool) = test_pool().await;
    let owner = seed_user(&pool, "owner@example.com").await;
    let stranger = seed_user(&pool, "stranger@example.com").await;
    let samosa = seed_product(&pool, "Samosa", 15.0, 5).await;

    cart_repo::add(&pool, &owner, &samosa, 1).await.unwrap();
    let engine = OrderEngine::new(pool.clone());
    let order = engine.place_order(&owner, &shipping()).await.unwrap();

    let err = engine
        .cancel_order(&order.id, &stranger, false, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Forbidden));
}

#[tokio::test]
async fn shipped_orders_cannot_be_cancelled() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;
    let admin = seed_user(&pool, "admin@example.com").await;
    let samosa = seed_product(&pool, "Samosa", 15.0, 5).await;

    cart_repo::add(&pool, &user, &samosa, 1).await.unwrap();
    let engine = OrderEngine::new(pool.clone());
    let order = engine.place_order(&user, &shipping()).await.unwrap();

    engine
        .update_status(&order.id, &admin, OrderStatus::Shipped, None)
        .await
        .unwrap();

    let err = engine.cancel_order(&order.id, &user, false, None).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition(_)));
    assert_eq!(stock_of(&pool, &samosa).await, 4);
}

#[tokio::test]
async fn lifecycle_walk_builds_ordered_history() {
    let (_dir, pool) = test_pool().await;
    let user = seed_user(&pool, "shopper@example.com").await;
    let admin = seed_user(&pool, "admin@example.com").await;
    let samosa = seed_product(&pool, "Samosa", 15.0, 5).await;

    cart_repo::add(&pool, &user, &samosa, 1).await.unwrap();
    let engine = OrderEngine::new(pool.clone());
    let order = engine.place_order(&user, &shipping()).await.unwrap();

    for status in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
        engine.update_status(&order.id, &admin, status, None).await.unwrap();
    }

    let done = order_repo::find_by_id(&pool, &order.id).await.unwrap();
    let statuses: Vec<_> = done.status_history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::Placed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ]
    );

    // terminal: no further moves, in either direction
    let err = engine
        .update_status(&order.id, &admin, OrderStatus::Processing, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition(_)));
    let err = engine.cancel_order(&order.id, &admin, true, None).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition(_)));
}

#[tokio::test]
async fn concurrent_checkout_never_oversells() {
    let (_dir, pool) = test_pool().await;
    let alice = seed_user(&pool, "alice@example.com").await;
    let bob = seed_user(&pool, "bob@example.com").await;
    let last_one = seed_product(&pool, "Last Laddoo", 25.0, 1).await;

    cart_repo::add(&pool, &alice, &last_one, 1).await.unwrap();
    cart_repo::add(&pool, &bob, &last_one, 1).await.unwrap();

    let engine_a = OrderEngine::new(pool.clone());
    let engine_b = OrderEngine::new(pool.clone());
    let addr = shipping();

    let (a, b) = tokio::join!(
        engine_a.place_order(&alice, &addr),
        engine_b.place_order(&bob, &addr),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one checkout may win the last unit");

    let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    match loser {
        OrderError::InsufficientStock(name) => assert_eq!(name, "Last Laddoo"),
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(stock_of(&pool, &last_one).await, 0);
}

#[tokio::test]
async fn admin_listing_filters_by_status_and_term() {
    let (_dir, pool) = test_pool().await;
    let alice = seed_user(&pool, "alice@example.com").await;
    let bob = seed_user(&pool, "bob@example.com").await;
    let samosa = seed_product(&pool, "Samosa", 15.0, 50).await;

    let engine = OrderEngine::new(pool.clone());
    cart_repo::add(&pool, &alice, &samosa, 1).await.unwrap();
    let alice_order = engine.place_order(&alice, &shipping()).await.unwrap();
    cart_repo::add(&pool, &bob, &samosa, 2).await.unwrap();
    let bob_order = engine.place_order(&bob, &shipping()).await.unwrap();

    engine.cancel_order(&bob_order.id, &bob, false, None).await.unwrap();

    // status filter
    let placed = order_repo::admin_list(
        &pool,
        &AdminOrderFilter {
            status: Some(OrderStatus::Placed),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].order.id, alice_order.id);

    // email term
    let by_email = order_repo::admin_list(
        &pool,
        &AdminOrderFilter {
            term: OrderSearchTerm::classify("ALICE@example.com"),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].customer_email, "alice@example.com");

    // order id term
    let by_id = order_repo::admin_list(
        &pool,
        &AdminOrderFilter {
            term: OrderSearchTerm::classify(&bob_order.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].order.status, OrderStatus::Cancelled);

    // free text matches snapshot item names
    let by_text = order_repo::admin_list(
        &pool,
        &AdminOrderFilter {
            term: OrderSearchTerm::classify("samosa"),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_text.len(), 2);
}
