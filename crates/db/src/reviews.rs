//! Database operations for product reviews.

use sqlx::PgPool;

use storekeep_core::ProductId;

use super::{RepositoryError, map_write_error};
use crate::models::{NewReview, Review};

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Post a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if the product or customer
    /// doesn't exist.
    pub async fn create(&self, input: &NewReview) -> Result<Review, RepositoryError> {
        if !input.rating.is_conventional() {
            tracing::warn!(
                product_id = %input.product_id,
                rating = %input.rating,
                "Review rating outside the usual 1-5 range"
            );
        }

        let review = sqlx::query_as::<_, Review>(
            r"
            INSERT INTO reviews (product_id, customer_id, review_date, rating, review_text)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING review_id, product_id, customer_id, review_date, rating, review_text
            ",
        )
        .bind(input.product_id)
        .bind(input.customer_id)
        .bind(input.review_date)
        .bind(input.rating)
        .bind(&input.review_text)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "review"))?;

        tracing::info!(
            review_id = %review.review_id,
            product_id = %review.product_id,
            "Posted review"
        );
        Ok(review)
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn for_product(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(
            r"
            SELECT review_id, product_id, customer_id, review_date, rating, review_text
            FROM reviews
            WHERE product_id = $1
            ORDER BY review_date DESC, review_id DESC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }
}
