//! Database operations for payments.

use sqlx::PgPool;

use storekeep_core::{OrderId, PaymentId, PaymentStatus};

use super::{RepositoryError, map_write_error};
use crate::models::{NewPayment, Payment};

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a payment for an order. The payment starts out `Paid`.
    ///
    /// The amount is not checked against the order total here; a mismatch
    /// only matters when the order is refunded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order already has a payment,
    /// or `RepositoryError::MissingReference` if the order doesn't exist.
    pub async fn create(&self, input: &NewPayment) -> Result<Payment, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(
            r"
            INSERT INTO payments (order_id, payment_date, payment_amount, payment_method, payment_status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING payment_id, order_id, payment_date, payment_amount,
                      payment_method, payment_status
            ",
        )
        .bind(input.order_id)
        .bind(input.payment_date)
        .bind(input.payment_amount)
        .bind(input.payment_method)
        .bind(PaymentStatus::Paid)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "payment"))?;

        tracing::info!(
            payment_id = %payment.payment_id,
            order_id = %payment.order_id,
            amount = %payment.payment_amount,
            method = %payment.payment_method,
            "Recorded payment"
        );
        Ok(payment)
    }

    /// Get a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(
            r"
            SELECT payment_id, order_id, payment_date, payment_amount,
                   payment_method, payment_status
            FROM payments
            WHERE payment_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(payment)
    }

    /// Get the payment recorded for an order, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn for_order(&self, order_id: OrderId) -> Result<Option<Payment>, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(
            r"
            SELECT payment_id, order_id, payment_date, payment_amount,
                   payment_method, payment_status
            FROM payments
            WHERE order_id = $1
            ",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(payment)
    }
}
