//! Read-only reporting queries.
//!
//! Aggregation happens in `PostgreSQL`. Each report maps its rows into the
//! corresponding type from [`storekeep_core::reports`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use storekeep_core::reports::{
    BestSeller, InactiveCustomer, OrderTotal, ProductRating, trailing_window_start,
};
use storekeep_core::{CustomerId, Email, Money, OrderId, ProductId};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderTotalRow {
    order_id: OrderId,
    customer_id: CustomerId,
    customer_name: String,
    order_date: NaiveDate,
    total_amount: Money,
    items_total: Decimal,
    item_count: i64,
}

impl From<OrderTotalRow> for OrderTotal {
    fn from(row: OrderTotalRow) -> Self {
        Self {
            order_id: row.order_id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            order_date: row.order_date,
            total_amount: row.total_amount,
            items_total: row.items_total,
            item_count: row.item_count,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InactiveCustomerRow {
    customer_id: CustomerId,
    name: String,
    email: Email,
    last_order_date: Option<NaiveDate>,
}

impl From<InactiveCustomerRow> for InactiveCustomer {
    fn from(row: InactiveCustomerRow) -> Self {
        Self {
            customer_id: row.customer_id,
            name: row.name,
            email: row.email,
            last_order_date: row.last_order_date,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BestSellerRow {
    sales_rank: i64,
    product_id: ProductId,
    name: String,
    total_sold: i64,
}

impl From<BestSellerRow> for BestSeller {
    fn from(row: BestSellerRow) -> Self {
        Self {
            rank: row.sales_rank,
            product_id: row.product_id,
            name: row.name,
            total_sold: row.total_sold,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRatingRow {
    product_id: ProductId,
    name: String,
    average_rating: Decimal,
    review_count: i64,
}

impl From<ProductRatingRow> for ProductRating {
    fn from(row: ProductRatingRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            average_rating: row.average_rating,
            review_count: row.review_count,
        }
    }
}

// =============================================================================
// ReportRepository
// =============================================================================

/// Repository for reporting queries.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every order that has at least one line item, with its customer, the
    /// recorded total, and the sum of its items. Ordered by order ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn order_totals(&self) -> Result<Vec<OrderTotal>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderTotalRow>(
            r"
            SELECT o.order_id,
                   o.customer_id,
                   c.name AS customer_name,
                   o.order_date,
                   o.total_amount,
                   SUM(oi.quantity * oi.unit_price) AS items_total,
                   COUNT(oi.order_item_id) AS item_count
            FROM orders o
            JOIN customers c ON c.customer_id = o.customer_id
            JOIN order_items oi ON oi.order_id = o.order_id
            GROUP BY o.order_id, c.customer_id
            ORDER BY o.order_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderTotal::from).collect())
    }

    /// Customers with no order dated in the `days`-day window ending on
    /// `as_of` (both ends inclusive). Ordered by customer ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn inactive_customers(
        &self,
        as_of: NaiveDate,
        days: u32,
    ) -> Result<Vec<InactiveCustomer>, RepositoryError> {
        let window_start = trailing_window_start(as_of, days);

        let rows = sqlx::query_as::<_, InactiveCustomerRow>(
            r"
            SELECT c.customer_id,
                   c.name,
                   c.email,
                   (SELECT MAX(prior.order_date)
                    FROM orders prior
                    WHERE prior.customer_id = c.customer_id
                      AND prior.order_date <= $2) AS last_order_date
            FROM customers c
            LEFT JOIN orders recent
                   ON recent.customer_id = c.customer_id
                  AND recent.order_date BETWEEN $1 AND $2
            WHERE recent.order_id IS NULL
            ORDER BY c.customer_id
            ",
        )
        .bind(window_start)
        .bind(as_of)
        .fetch_all(self.pool)
        .await?;

        tracing::debug!(
            %as_of,
            %window_start,
            count = rows.len(),
            "Computed inactive customers"
        );
        Ok(rows.into_iter().map(InactiveCustomer::from).collect())
    }

    /// Products ranked by units sold, highest first, keeping the first
    /// `limit` rows. Ties share a rank and the next rank skips.
    ///
    /// Products that never sold are not ranked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn best_sellers(&self, limit: i64) -> Result<Vec<BestSeller>, RepositoryError> {
        let rows = sqlx::query_as::<_, BestSellerRow>(
            r"
            SELECT sales_rank, product_id, name, total_sold
            FROM (
                SELECT p.product_id,
                       p.name,
                       SUM(oi.quantity) AS total_sold,
                       RANK() OVER (ORDER BY SUM(oi.quantity) DESC) AS sales_rank
                FROM products p
                JOIN order_items oi ON oi.product_id = p.product_id
                GROUP BY p.product_id
            ) ranked
            ORDER BY sales_rank, product_id
            LIMIT $1
            ",
        )
        .bind(limit.max(0))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(BestSeller::from).collect())
    }

    /// Average rating per reviewed product, rounded to two decimals.
    /// Products without reviews are absent. Ordered by product ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn average_ratings(&self) -> Result<Vec<ProductRating>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRatingRow>(
            r"
            SELECT p.product_id,
                   p.name,
                   ROUND(AVG(r.rating), 2) AS average_rating,
                   COUNT(r.review_id) AS review_count
            FROM products p
            JOIN reviews r ON r.product_id = p.product_id
            GROUP BY p.product_id
            ORDER BY p.product_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductRating::from).collect())
    }
}
