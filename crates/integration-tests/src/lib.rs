//! Integration tests for Storekeep.
//!
//! # Running Tests
//!
//! ```bash
//! # Point at a scratch PostgreSQL database
//! export DATABASE_URL=postgres://localhost/storekeep_test
//!
//! # Run integration tests
//! cargo test -p storekeep-integration-tests -- --ignored
//! ```
//!
//! Each test gets its own schema (`it_<uuid>`) with the migrations applied,
//! so tests can run in parallel and reports only see the test's own rows.
//!
//! # Test Categories
//!
//! - `stock_adjustment` - Line items and stock policies
//! - `refund` - Refund workflow
//! - `reports` - Reporting queries
//! - `repositories` - Constraint mapping

use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use storekeep_core::{Email, Money, OrderId, PaymentMethod, Rating};
use storekeep_db::models::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewPayment, NewProduct, NewReview, Order,
    Payment, Product,
};
use storekeep_db::{
    CustomerRepository, OrderRepository, PaymentRepository, ProductRepository, ReviewRepository,
};

/// A migrated, isolated schema and a pool whose connections use it.
pub struct TestContext {
    pub pool: PgPool,
    database_url: String,
    schema: String,
}

impl TestContext {
    /// Create a fresh schema and apply the migrations to it.
    ///
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is unset or the database is unreachable.
    pub async fn new() -> Self {
        let _ = dotenvy::dotenv();
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
        let schema = format!("it_{}", Uuid::new_v4().simple());

        let admin = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to database");
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .expect("Failed to create test schema");
        admin.close().await;

        let search_path = format!("SET search_path TO {schema}");
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    sqlx::query(&search_path).execute(conn).await?;
                    Ok(())
                })
            })
            .connect(&database_url)
            .await
            .expect("Failed to connect to test schema");

        storekeep_db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            database_url,
            schema,
        }
    }

    /// Close the pool and drop the test schema.
    pub async fn cleanup(self) {
        self.pool.close().await;
        if let Ok(admin) = PgPool::connect(&self.database_url).await {
            let _ = sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
                .execute(&admin)
                .await;
            admin.close().await;
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    /// Register a customer with a unique email derived from `name`.
    pub async fn customer(&self, name: &str) -> Customer {
        let local = name.to_ascii_lowercase().replace(' ', ".");
        CustomerRepository::new(&self.pool)
            .create(&NewCustomer {
                name: name.to_string(),
                email: email(&format!("{local}@example.com")),
                address: None,
                phone: None,
            })
            .await
            .expect("Failed to create customer")
    }

    /// Add a product with the given price and stock.
    pub async fn product(&self, name: &str, price: &str, stock: i32) -> Product {
        ProductRepository::new(&self.pool)
            .create(&NewProduct {
                name: name.to_string(),
                price: money(price),
                stock_quantity: stock,
            })
            .await
            .expect("Failed to create product")
    }

    /// Current state of a product.
    pub async fn reload_product(&self, product: &Product) -> Product {
        ProductRepository::new(&self.pool)
            .get_by_id(product.product_id)
            .await
            .expect("Failed to load product")
            .expect("Product disappeared")
    }

    /// Current state of an order.
    pub async fn reload_order(&self, order_id: OrderId) -> Order {
        OrderRepository::new(&self.pool)
            .get_by_id(order_id)
            .await
            .expect("Failed to load order")
            .expect("Order disappeared")
    }

    /// Current payment of an order.
    pub async fn payment_for(&self, order_id: OrderId) -> Option<Payment> {
        PaymentRepository::new(&self.pool)
            .for_order(order_id)
            .await
            .expect("Failed to load payment")
    }

    /// Place an order for `customer` with `items` as `(product, quantity)`
    /// at the products' current prices.
    pub async fn order(
        &self,
        customer: &Customer,
        order_date: &str,
        total: &str,
        items: &[(&Product, i32)],
    ) -> Order {
        let items: Vec<NewOrderItem> = items
            .iter()
            .map(|(product, quantity)| NewOrderItem {
                product_id: product.product_id,
                quantity: *quantity,
                unit_price: None,
            })
            .collect();

        OrderRepository::new(&self.pool)
            .with_stock_policy(storekeep_core::StockPolicy::Backorder)
            .place_order(
                &NewOrder {
                    customer_id: customer.customer_id,
                    order_date: date(order_date),
                    total_amount: money(total),
                    order_status: storekeep_core::OrderStatus::Pending,
                },
                &items,
            )
            .await
            .expect("Failed to place order")
            .order
    }

    /// Record a card payment of `amount` for `order`.
    pub async fn pay(&self, order: &Order, amount: &str) -> Payment {
        PaymentRepository::new(&self.pool)
            .create(&NewPayment {
                order_id: order.order_id,
                payment_date: order.order_date,
                payment_amount: money(amount),
                payment_method: PaymentMethod::CreditCard,
            })
            .await
            .expect("Failed to record payment")
    }

    /// Post a review.
    pub async fn review(&self, product: &Product, customer: &Customer, rating: i32) {
        ReviewRepository::new(&self.pool)
            .create(&NewReview {
                product_id: product.product_id,
                customer_id: customer.customer_id,
                review_date: date("2024-03-01"),
                rating: Rating::new(rating),
                review_text: None,
            })
            .await
            .expect("Failed to post review");
    }
}

/// Parse a money literal.
///
/// # Panics
///
/// Panics if `s` is not a valid amount.
#[must_use]
pub fn money(s: &str) -> Money {
    s.parse().expect("invalid money literal")
}

/// Parse a `YYYY-MM-DD` date literal.
///
/// # Panics
///
/// Panics if `s` is not a valid date.
#[must_use]
pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("invalid date literal")
}

/// Parse an email literal.
///
/// # Panics
///
/// Panics if `s` is not a valid email.
#[must_use]
pub fn email(s: &str) -> Email {
    Email::parse(s).expect("invalid email literal")
}
