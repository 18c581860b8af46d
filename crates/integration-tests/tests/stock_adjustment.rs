//! Integration tests for line items and stock adjustment.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `DATABASE_URL`.
//!
//! Run with: cargo test -p storekeep-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use storekeep_core::{CustomerId, OrderStatus, StockError, StockPolicy};
use storekeep_db::models::{NewOrder, NewOrderItem};
use storekeep_db::{OrderRepository, RepositoryError};
use storekeep_integration_tests::{TestContext, date, money};

fn header(customer_id: CustomerId, total: &str) -> NewOrder {
    NewOrder {
        customer_id,
        order_date: date("2024-03-15"),
        total_amount: money(total),
        order_status: OrderStatus::Pending,
    }
}

// ============================================================================
// Stock Policy Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_line_item_decrements_stock() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("John Doe").await;
    let laptop = ctx.product("Laptop", "1000.00", 10).await;

    let repo = OrderRepository::new(&ctx.pool);
    let order = repo.create(&header(customer.customer_id, "3000.00")).await.unwrap();
    let item = repo
        .add_item(
            order.order_id,
            &NewOrderItem {
                product_id: laptop.product_id,
                quantity: 3,
                unit_price: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(item.unit_price, money("1000.00"));
    assert_eq!(ctx.reload_product(&laptop).await.stock_quantity, 7);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_reject_policy_refuses_oversell_and_writes_nothing() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Jane Smith").await;
    let phone = ctx.product("Phone", "500.00", 5).await;

    let repo = OrderRepository::new(&ctx.pool).with_stock_policy(StockPolicy::Reject);
    let order = repo.create(&header(customer.customer_id, "4000.00")).await.unwrap();
    let err = repo
        .add_item(
            order.order_id,
            &NewOrderItem {
                product_id: phone.product_id,
                quantity: 8,
                unit_price: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::Stock(StockError::Insufficient {
            requested: 8,
            available: 5
        })
    ));
    assert_eq!(ctx.reload_product(&phone).await.stock_quantity, 5);
    assert!(repo.items(order.order_id).await.unwrap().is_empty());

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_clamp_and_backorder_policies() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Carlos Reyes").await;
    let cable = ctx.product("Cable", "12.50", 5).await;
    let charger = ctx.product("Charger", "30.00", 5).await;

    let order = OrderRepository::new(&ctx.pool)
        .create(&header(customer.customer_id, "340.00"))
        .await
        .unwrap();

    OrderRepository::new(&ctx.pool)
        .with_stock_policy(StockPolicy::Clamp)
        .add_item(
            order.order_id,
            &NewOrderItem {
                product_id: cable.product_id,
                quantity: 8,
                unit_price: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(ctx.reload_product(&cable).await.stock_quantity, 0);

    OrderRepository::new(&ctx.pool)
        .with_stock_policy(StockPolicy::Backorder)
        .add_item(
            order.order_id,
            &NewOrderItem {
                product_id: charger.product_id,
                quantity: 8,
                unit_price: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(ctx.reload_product(&charger).await.stock_quantity, -3);

    ctx.cleanup().await;
}

// ============================================================================
// Line Item Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_unit_price_is_a_snapshot() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Mei Chen").await;
    let headphones = ctx.product("Headphones", "150.00", 10).await;

    let repo = OrderRepository::new(&ctx.pool);
    let order = repo.create(&header(customer.customer_id, "270.00")).await.unwrap();
    repo.add_item(
        order.order_id,
        &NewOrderItem {
            product_id: headphones.product_id,
            quantity: 1,
            unit_price: Some(money("120.00")),
        },
    )
    .await
    .unwrap();

    storekeep_db::ProductRepository::new(&ctx.pool)
        .update_price(headphones.product_id, money("175.00"))
        .await
        .unwrap();

    let items = repo.items(order.order_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().unwrap().unit_price, money("120.00"));

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_place_order_is_atomic() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Ann Lee").await;
    let mug = ctx.product("Mug", "8.00", 10).await;
    let teapot = ctx.product("Teapot", "40.00", 1).await;

    let repo = OrderRepository::new(&ctx.pool);
    let err = repo
        .place_order(
            &header(customer.customer_id, "96.00"),
            &[
                NewOrderItem {
                    product_id: mug.product_id,
                    quantity: 2,
                    unit_price: None,
                },
                NewOrderItem {
                    product_id: teapot.product_id,
                    quantity: 2,
                    unit_price: None,
                },
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::Stock(_)));
    assert!(
        repo.list_for_customer(customer.customer_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(ctx.reload_product(&mug).await.stock_quantity, 10);
    assert_eq!(ctx.reload_product(&teapot).await.stock_quantity, 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_unknown_product_and_order() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Bob Stone").await;
    let mug = ctx.product("Mug", "8.00", 10).await;

    let repo = OrderRepository::new(&ctx.pool);
    let order = repo.create(&header(customer.customer_id, "8.00")).await.unwrap();

    let err = repo
        .add_item(
            order.order_id,
            &NewOrderItem {
                product_id: storekeep_core::ProductId::new(999_999),
                quantity: 1,
                unit_price: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::MissingReference(_)));

    let err = repo
        .add_item(
            storekeep_core::OrderId::new(999_999),
            &NewOrderItem {
                product_id: mug.product_id,
                quantity: 1,
                unit_price: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
    assert_eq!(ctx.reload_product(&mug).await.stock_quantity, 10);

    ctx.cleanup().await;
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_concurrent_line_items_serialize_on_stock() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Dana Park").await;
    let widget = ctx.product("Widget", "1.00", 10).await;

    let order = OrderRepository::new(&ctx.pool)
        .create(&header(customer.customer_id, "12.00"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..12 {
        let pool = ctx.pool.clone();
        let order_id = order.order_id;
        let product_id = widget.product_id;
        handles.push(tokio::spawn(async move {
            OrderRepository::new(&pool)
                .add_item(
                    order_id,
                    &NewOrderItem {
                        product_id,
                        quantity: 1,
                        unit_price: None,
                    },
                )
                .await
                .is_ok()
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 10);
    assert_eq!(ctx.reload_product(&widget).await.stock_quantity, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_orders_listing_products_in_opposite_order_do_not_deadlock() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Eli Novak").await;
    let kettle = ctx.product("Kettle", "30.00", 1_000).await;
    let teapot = ctx.product("Teapot", "20.00", 1_000).await;

    let mut handles = Vec::new();
    for n in 0..40 {
        let pool = ctx.pool.clone();
        let input = header(customer.customer_id, "50.00");
        let first = NewOrderItem {
            product_id: kettle.product_id,
            quantity: 1,
            unit_price: None,
        };
        let second = NewOrderItem {
            product_id: teapot.product_id,
            quantity: 1,
            unit_price: None,
        };
        let items = if n % 2 == 0 {
            vec![first, second]
        } else {
            vec![second, first]
        };
        handles.push(tokio::spawn(async move {
            let placed = OrderRepository::new(&pool)
                .with_stock_policy(StockPolicy::Reject)
                .place_order(&input, &items)
                .await?;
            let recorded: Vec<_> = placed.items.iter().map(|i| i.product_id).collect();
            let requested: Vec<_> = items.iter().map(|i| i.product_id).collect();
            assert_eq!(recorded, requested);
            Ok::<_, RepositoryError>(())
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ctx.reload_product(&kettle).await.stock_quantity, 960);
    assert_eq!(ctx.reload_product(&teapot).await.stock_quantity, 960);

    ctx.cleanup().await;
}
