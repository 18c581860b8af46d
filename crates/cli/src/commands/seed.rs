//! Seed the database with sample data.
//!
//! Reads customers, products, orders (with line items and an optional
//! payment), and reviews from a YAML file. Orders and reviews reference
//! customers by email and products by name; every reference is checked
//! before connecting to the database.
//!
//! Rows are inserted through the repositories, so line items decrement stock
//! under the configured `STOCK_POLICY`. Each order is placed atomically, but
//! the file as a whole is not: a failure leaves earlier rows in place.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use storekeep_core::{
    CustomerId, Email, Money, OrderStatus, PaymentMethod, ProductId, Rating,
};
use storekeep_db::models::{
    NewCustomer, NewOrder, NewOrderItem, NewPayment, NewProduct, NewReview,
};
use storekeep_db::{
    CustomerRepository, OrderRepository, PaymentRepository, ProductRepository, ReviewRepository,
};

/// Seed file used when `--file` is not given, relative to the workspace root.
pub const DEFAULT_SEED_FILE: &str = "crates/cli/seed/sample.yaml";

/// Contents of a seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub customers: Vec<NewCustomer>,
    #[serde(default)]
    pub products: Vec<NewProduct>,
    #[serde(default)]
    pub orders: Vec<SeedOrder>,
    #[serde(default)]
    pub reviews: Vec<SeedReview>,
}

/// An order with its line items and payment.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedOrder {
    /// Email of a customer in the same file.
    pub customer: Email,
    pub order_date: NaiveDate,
    pub total_amount: Money,
    #[serde(default)]
    pub order_status: OrderStatus,
    pub items: Vec<SeedItem>,
    #[serde(default)]
    pub payment: Option<SeedPayment>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedItem {
    /// Name of a product in the same file.
    pub product: String,
    pub quantity: i32,
    #[serde(default)]
    pub unit_price: Option<Money>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedPayment {
    pub payment_date: NaiveDate,
    pub payment_amount: Money,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedReview {
    pub product: String,
    pub customer: Email,
    pub review_date: NaiveDate,
    pub rating: Rating,
    #[serde(default)]
    pub review_text: Option<String>,
}

/// Problems found in a seed file before anything is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("customer {0} is listed more than once")]
    DuplicateCustomer(Email),
    #[error("product {0:?} is listed more than once")]
    DuplicateProduct(String),
    #[error("unknown customer: {0}")]
    UnknownCustomer(Email),
    #[error("unknown product: {0:?}")]
    UnknownProduct(String),
    #[error("order #{0} has no items")]
    EmptyOrder(usize),
}

/// Counts of inserted rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
    pub items: usize,
    pub payments: usize,
    pub reviews: usize,
}

/// Check that every reference in `seed` resolves within the file.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<SeedError> {
    let mut errors = Vec::new();

    let mut customers = HashSet::new();
    for customer in &seed.customers {
        if !customers.insert(&customer.email) {
            errors.push(SeedError::DuplicateCustomer(customer.email.clone()));
        }
    }

    let mut products = HashSet::new();
    for product in &seed.products {
        if !products.insert(product.name.as_str()) {
            errors.push(SeedError::DuplicateProduct(product.name.clone()));
        }
    }

    for (index, order) in seed.orders.iter().enumerate() {
        if !customers.contains(&order.customer) {
            errors.push(SeedError::UnknownCustomer(order.customer.clone()));
        }
        if order.items.is_empty() {
            errors.push(SeedError::EmptyOrder(index + 1));
        }
        for item in &order.items {
            if !products.contains(item.product.as_str()) {
                errors.push(SeedError::UnknownProduct(item.product.clone()));
            }
        }
    }

    for review in &seed.reviews {
        if !customers.contains(&review.customer) {
            errors.push(SeedError::UnknownCustomer(review.customer.clone()));
        }
        if !products.contains(review.product.as_str()) {
            errors.push(SeedError::UnknownProduct(review.product.clone()));
        }
    }

    errors
}

/// Load a seed file and insert its rows.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database insert fails.
pub async fn run(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let (config, pool) = super::connect().await?;
    let summary = insert(&pool, &seed, config.stock_policy).await?;
    pool.close().await;

    info!("Seeding complete!");
    info!("  Customers: {}", summary.customers);
    info!("  Products: {}", summary.products);
    info!("  Orders: {} ({} items)", summary.orders, summary.items);
    info!("  Payments: {}", summary.payments);
    info!("  Reviews: {}", summary.reviews);

    Ok(())
}

async fn insert(
    pool: &sqlx::PgPool,
    seed: &SeedFile,
    stock_policy: storekeep_core::StockPolicy,
) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let mut summary = SeedSummary::default();

    let mut customer_ids: HashMap<Email, CustomerId> = HashMap::new();
    let customer_repo = CustomerRepository::new(pool);
    for customer in &seed.customers {
        let created = customer_repo.create(customer).await?;
        customer_ids.insert(created.email, created.customer_id);
        summary.customers += 1;
    }

    let mut product_ids: HashMap<&str, ProductId> = HashMap::new();
    let product_repo = ProductRepository::new(pool);
    for product in &seed.products {
        let created = product_repo.create(product).await?;
        product_ids.insert(product.name.as_str(), created.product_id);
        summary.products += 1;
    }

    let customer_id = |email: &Email| {
        customer_ids
            .get(email)
            .copied()
            .ok_or_else(|| SeedError::UnknownCustomer(email.clone()))
    };
    let product_id = |name: &str| {
        product_ids
            .get(name)
            .copied()
            .ok_or_else(|| SeedError::UnknownProduct(name.to_string()))
    };

    let order_repo = OrderRepository::new(pool).with_stock_policy(stock_policy);
    let payment_repo = PaymentRepository::new(pool);
    for order in &seed.orders {
        let header = NewOrder {
            customer_id: customer_id(&order.customer)?,
            order_date: order.order_date,
            total_amount: order.total_amount,
            order_status: order.order_status,
        };
        let items = order
            .items
            .iter()
            .map(|item| {
                Ok(NewOrderItem {
                    product_id: product_id(&item.product)?,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        let placed = order_repo.place_order(&header, &items).await?;
        summary.orders += 1;
        summary.items += placed.items.len();

        if let Some(payment) = &order.payment {
            payment_repo
                .create(&NewPayment {
                    order_id: placed.order.order_id,
                    payment_date: payment.payment_date,
                    payment_amount: payment.payment_amount,
                    payment_method: payment.payment_method,
                })
                .await?;
            summary.payments += 1;
        }
    }

    let review_repo = ReviewRepository::new(pool);
    for review in &seed.reviews {
        review_repo
            .create(&NewReview {
                product_id: product_id(&review.product)?,
                customer_id: customer_id(&review.customer)?,
                review_date: review.review_date,
                rating: review.rating,
                review_text: review.review_text.clone(),
            })
            .await?;
        summary.reviews += 1;
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../seed/sample.yaml");

    #[test]
    fn test_sample_file_is_valid() {
        let seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(validate(&seed).is_empty());
        assert_eq!(seed.customers.len(), 4);
        assert_eq!(seed.orders.len(), 3);
    }

    #[test]
    fn test_sample_file_has_refund_scenarios() {
        let seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();

        let paid_in_full = seed.orders.first().unwrap();
        assert_eq!(paid_in_full.total_amount.to_string(), "1500.00");
        let payment = paid_in_full.payment.as_ref().unwrap();
        assert_eq!(payment.payment_amount, paid_in_full.total_amount);
        assert_eq!(payment.payment_method, PaymentMethod::CreditCard);

        let underpaid = seed.orders.get(1).unwrap();
        assert_eq!(underpaid.total_amount.to_string(), "650.00");
        assert_eq!(underpaid.order_status, OrderStatus::Pending);
        assert_eq!(
            underpaid.payment.as_ref().unwrap().payment_amount.to_string(),
            "500.00"
        );
    }

    #[test]
    fn test_validation_reports_dangling_references() {
        let seed: SeedFile = serde_yaml::from_str(
            r"
customers:
  - name: Ann
    email: ann@example.com
  - name: Ann Again
    email: ann@example.com
products:
  - name: Mug
    price: '8.00'
orders:
  - customer: bob@example.com
    order_date: 2024-02-01
    total_amount: '8.00'
    items:
      - product: Teapot
        quantity: 1
  - customer: ann@example.com
    order_date: 2024-02-02
    total_amount: '0.00'
    items: []
",
        )
        .unwrap();

        let errors = validate(&seed);
        let ann: Email = "ann@example.com".parse().unwrap();
        let bob: Email = "bob@example.com".parse().unwrap();
        assert_eq!(
            errors,
            vec![
                SeedError::DuplicateCustomer(ann),
                SeedError::UnknownCustomer(bob),
                SeedError::UnknownProduct("Teapot".to_string()),
                SeedError::EmptyOrder(2),
            ]
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<SeedFile, _> = serde_yaml::from_str("shipments: []\n");
        assert!(result.is_err());
    }
}
