//! Product reviews.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storekeep_core::{CustomerId, ProductId, Rating, ReviewId};

/// A customer's review of a product. Not tied to a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub review_id: ReviewId,
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub review_date: NaiveDate,
    pub rating: Rating,
    pub review_text: Option<String>,
}

/// Input for posting a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub review_date: NaiveDate,
    pub rating: Rating,
    #[serde(default)]
    pub review_text: Option<String>,
}
