//! Storekeep database layer for `PostgreSQL`.
//!
//! # Tables
//!
//! - `customers` - Registered customers (unique email)
//! - `products` - Catalog with price and `stock_quantity`
//! - `orders` - Order headers with `total_amount` and `order_status`
//! - `order_items` - Line items with a `unit_price` snapshot
//! - `payments` - One payment per order, `payment_method` + `payment_status`
//! - `reviews` - Product ratings by customers
//!
//! # Workflows
//!
//! - Recording a line item locks the product row, applies the configured
//!   [`StockPolicy`](storekeep_core::StockPolicy), and writes the item and the
//!   new stock level in one transaction ([`OrderRepository::add_item`]).
//! - Refunds lock the order and its payment, check the amounts with
//!   [`plan_refund`](storekeep_core::plan_refund), and mark both rows
//!   `Refunded` in one transaction ([`OrderRepository::refund`]).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/db/migrations/`, embedded at compile
//! time, and run via:
//! ```bash
//! cargo run -p storekeep-cli -- migrate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod customers;
pub mod models;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reports;
pub mod reviews;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use storekeep_core::{RefundError, StockError};

pub use config::{ConfigError, PoolSettings, StoreConfig};
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use payments::PaymentRepository;
pub use products::ProductRepository;
pub use reports::ReportRepository;
pub use reviews::ReviewRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate email, second payment).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key points at a row that does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// Line item rejected by the stock policy.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Refund rejected by the refund rules.
    #[error(transparent)]
    Refund(#[from] RefundError),
}

/// Classify a failed `INSERT`/`UPDATE` by the constraint it tripped.
///
/// `what` names the row being written and prefixes the message.
pub(crate) fn map_write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or("unique");
        return RepositoryError::Conflict(format!("{what} violates {constraint}"));
    }
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        let constraint = db_err.constraint().unwrap_or("foreign key");
        return RepositoryError::MissingReference(format!("{what} violates {constraint}"));
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    settings: &PoolSettings,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the embedded schema migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running schema migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Schema migrations complete");
    Ok(())
}
