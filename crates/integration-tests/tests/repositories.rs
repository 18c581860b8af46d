//! Integration tests for constraint handling in the repositories.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `DATABASE_URL`.
//!
//! Run with: cargo test -p storekeep-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use storekeep_core::{CustomerId, OrderId, OrderStatus, PaymentMethod};
use storekeep_db::models::{NewCustomer, NewOrder, NewPayment};
use storekeep_db::{CustomerRepository, OrderRepository, PaymentRepository, RepositoryError};
use storekeep_integration_tests::{TestContext, date, email, money};

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_duplicate_email_is_a_conflict() {
    let ctx = TestContext::new().await;
    ctx.customer("John Doe").await;

    let err = CustomerRepository::new(&ctx.pool)
        .create(&NewCustomer {
            name: "Johnny Doe".to_string(),
            email: email("john.doe@EXAMPLE.com"),
            address: None,
            phone: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let found = CustomerRepository::new(&ctx.pool)
        .get_by_email(&email("john.doe@example.com"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "John Doe");

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_order_for_unknown_customer_is_missing_reference() {
    let ctx = TestContext::new().await;

    let err = OrderRepository::new(&ctx.pool)
        .create(&NewOrder {
            customer_id: CustomerId::new(999_999),
            order_date: date("2024-03-01"),
            total_amount: money("10.00"),
            order_status: OrderStatus::Pending,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::MissingReference(_)));

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_second_payment_for_an_order_is_a_conflict() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Jane Smith").await;
    let mug = ctx.product("Mug", "8.00", 10).await;
    let order = ctx.order(&customer, "2024-03-01", "8.00", &[(&mug, 1)]).await;
    ctx.pay(&order, "8.00").await;

    let payments = PaymentRepository::new(&ctx.pool);
    let err = payments
        .create(&NewPayment {
            order_id: order.order_id,
            payment_date: date("2024-03-02"),
            payment_amount: money("8.00"),
            payment_method: PaymentMethod::Cash,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let err = payments
        .create(&NewPayment {
            order_id: OrderId::new(999_999),
            payment_date: date("2024-03-02"),
            payment_amount: money("8.00"),
            payment_method: PaymentMethod::Cash,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::MissingReference(_)));

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_status_moves_between_pending_and_completed() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("Mei Chen").await;
    let mug = ctx.product("Mug", "8.00", 10).await;
    let order = ctx.order(&customer, "2024-03-01", "8.00", &[(&mug, 1)]).await;

    let repo = OrderRepository::new(&ctx.pool);
    let completed = repo
        .update_status(order.order_id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.order_status, OrderStatus::Completed);

    let err = repo
        .update_status(order.order_id, OrderStatus::Refunded)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    ctx.cleanup().await;
}
