//! Integration tests for the refund workflow.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `DATABASE_URL`.
//!
//! Run with: cargo test -p storekeep-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use storekeep_core::{OrderId, OrderStatus, PaymentStatus, RefundError};
use storekeep_db::{OrderRepository, RepositoryError};
use storekeep_integration_tests::{TestContext, money};

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_matching_payment_refunds_order_and_payment() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("John Doe").await;
    let laptop = ctx.product("Laptop", "1000.00", 10).await;
    let phone = ctx.product("Phone", "500.00", 20).await;

    let order = ctx
        .order(&customer, "2024-03-15", "1500.00", &[(&laptop, 1), (&phone, 1)])
        .await;
    ctx.pay(&order, "1500.00").await;

    assert_eq!(ctx.reload_product(&laptop).await.stock_quantity, 9);
    assert_eq!(ctx.reload_product(&phone).await.stock_quantity, 19);

    let plan = OrderRepository::new(&ctx.pool)
        .refund(order.order_id)
        .await
        .unwrap();
    assert_eq!(plan.amount, money("1500.00"));

    let order = ctx.reload_order(order.order_id).await;
    let payment = ctx.payment_for(order.order_id).await.unwrap();
    assert_eq!(order.order_status, OrderStatus::Refunded);
    assert_eq!(payment.payment_status, PaymentStatus::Refunded);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_mismatched_payment_changes_nothing() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Jane Smith").await;
    let phone = ctx.product("Phone", "500.00", 20).await;
    let headphones = ctx.product("Headphones", "150.00", 20).await;

    let order = ctx
        .order(&customer, "2024-03-20", "650.00", &[(&phone, 1), (&headphones, 1)])
        .await;
    ctx.pay(&order, "500.00").await;

    let err = OrderRepository::new(&ctx.pool)
        .refund(order.order_id)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::Refund(RefundError::AmountMismatch { .. })
    ));
    assert!(err.to_string().contains("payment amount mismatch; refund failed"));

    let reloaded = ctx.reload_order(order.order_id).await;
    let payment = ctx.payment_for(order.order_id).await.unwrap();
    assert_eq!(reloaded.order_status, OrderStatus::Pending);
    assert_eq!(payment.payment_status, PaymentStatus::Paid);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_refund_is_not_repeatable() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Carlos Reyes").await;
    let cable = ctx.product("Cable", "12.50", 100).await;

    let order = ctx
        .order(&customer, "2024-01-05", "25.00", &[(&cable, 2)])
        .await;
    ctx.pay(&order, "25.00").await;

    let repo = OrderRepository::new(&ctx.pool);
    repo.refund(order.order_id).await.unwrap();
    let err = repo.refund(order.order_id).await.unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::Refund(RefundError::AlreadyRefunded(id)) if id == order.order_id
    ));

    // Refunded orders take no more items or status changes.
    let err = repo
        .update_status(order.order_id, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_refund_without_payment_or_order() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Mei Chen").await;
    let mug = ctx.product("Mug", "8.00", 10).await;
    let order = ctx.order(&customer, "2024-02-01", "8.00", &[(&mug, 1)]).await;

    let repo = OrderRepository::new(&ctx.pool);

    let err = repo.refund(order.order_id).await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Refund(RefundError::PaymentNotFound(_))
    ));

    let err = repo.refund(OrderId::new(999_999)).await.unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Refund(RefundError::OrderNotFound(_))
    ));

    assert_eq!(
        ctx.reload_order(order.order_id).await.order_status,
        OrderStatus::Pending
    );

    ctx.cleanup().await;
}
