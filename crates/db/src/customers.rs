//! Database operations for customers.

use sqlx::PgPool;

use storekeep_core::{CustomerId, Email};

use super::{RepositoryError, map_write_error};
use crate::models::{Customer, NewCustomer};

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(&self, input: &NewCustomer) -> Result<Customer, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"
            INSERT INTO customers (name, email, address, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING customer_id, name, email, address, phone
            ",
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "customer"))?;

        tracing::info!(customer_id = %customer.customer_id, "Registered customer");
        Ok(customer)
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"
            SELECT customer_id, name, email, address, phone
            FROM customers
            WHERE customer_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(customer)
    }

    /// Get a customer by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"
            SELECT customer_id, name, email, address, phone
            FROM customers
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(customer)
    }

    /// List all customers ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let customers = sqlx::query_as::<_, Customer>(
            r"
            SELECT customer_id, name, email, address, phone
            FROM customers
            ORDER BY customer_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }
}
