//! Report row types and date-window helpers.
//!
//! The aggregations themselves run in `PostgreSQL`; this module holds what the
//! queries return and the pieces of their inputs that are computed up front.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CustomerId, Email, Money, OrderId, ProductId};

/// Default length of the inactivity window, in days.
pub const DEFAULT_INACTIVE_DAYS: u32 = 30;

/// Default number of rows in the best-seller report.
pub const DEFAULT_BEST_SELLER_LIMIT: i64 = 5;

/// First day of the trailing window of `days` days ending on `as_of`.
///
/// The window is inclusive at both ends: with `days = 30` and
/// `as_of = 2024-03-31`, orders dated 2024-03-01 through 2024-03-31 count.
/// Dates before the calendar's minimum saturate to [`NaiveDate::MIN`].
#[must_use]
pub fn trailing_window_start(as_of: NaiveDate, days: u32) -> NaiveDate {
    as_of
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Competition ranks (`RANK()` semantics) for totals sorted descending.
///
/// Equal totals share a rank and the next distinct total skips ahead:
/// `[9, 7, 7, 3]` ranks as `[1, 2, 2, 4]`.
#[must_use]
pub fn assign_ranks(sorted_totals: &[i64]) -> Vec<i64> {
    let mut ranks = Vec::with_capacity(sorted_totals.len());
    let mut current = 0_i64;
    let mut previous = None;
    for (position, &total) in (1_i64..).zip(sorted_totals) {
        if previous != Some(total) {
            current = position;
            previous = Some(total);
        }
        ranks.push(current);
    }
    ranks
}

/// One order with its customer and the sum of its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotal {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub order_date: NaiveDate,
    /// `orders.total_amount` as recorded.
    pub total_amount: Money,
    /// `SUM(quantity * unit_price)` over the order's items. Not bounded by
    /// the column precision, so kept as a plain decimal.
    pub items_total: Decimal,
    pub item_count: i64,
}

impl OrderTotal {
    /// Whether the recorded total disagrees with the line items.
    #[must_use]
    pub fn is_inconsistent(&self) -> bool {
        self.total_amount.amount() != self.items_total
    }
}

/// A customer with no order inside the inactivity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveCustomer {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: Email,
    /// Most recent order on or before the report date, if any.
    pub last_order_date: Option<NaiveDate>,
}

/// A product ranked by units sold.
///
/// `rank` follows SQL `RANK()`: equal totals share a rank and the next rank
/// skips (1, 2, 2, 4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSeller {
    pub rank: i64,
    pub product_id: ProductId,
    pub name: String,
    pub total_sold: i64,
}

/// Average review rating of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRating {
    pub product_id: ProductId,
    pub name: String,
    pub average_rating: Decimal,
    pub review_count: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_window_start_is_thirty_days_back() {
        assert_eq!(
            trailing_window_start(date("2024-03-31"), DEFAULT_INACTIVE_DAYS),
            date("2024-03-01")
        );
        assert_eq!(
            trailing_window_start(date("2024-01-10"), 30),
            date("2023-12-11")
        );
    }

    #[test]
    fn test_zero_day_window_is_just_today() {
        let as_of = date("2024-03-31");
        assert_eq!(trailing_window_start(as_of, 0), as_of);
    }

    #[test]
    fn test_window_saturates_at_calendar_minimum() {
        assert_eq!(trailing_window_start(NaiveDate::MIN, 1), NaiveDate::MIN);
    }

    #[test]
    fn test_ranks_skip_after_ties() {
        assert_eq!(assign_ranks(&[9, 7, 7, 3]), vec![1, 2, 2, 4]);
        assert_eq!(assign_ranks(&[5, 5, 5]), vec![1, 1, 1]);
        assert_eq!(assign_ranks(&[4, 3, 2]), vec![1, 2, 3]);
        assert!(assign_ranks(&[]).is_empty());
    }

    #[test]
    fn test_order_total_consistency() {
        let mut row = OrderTotal {
            order_id: OrderId::new(1),
            customer_id: CustomerId::new(1),
            customer_name: "John Doe".to_owned(),
            order_date: date("2024-03-15"),
            total_amount: "1500.00".parse().unwrap(),
            items_total: Decimal::new(150_000, 2),
            item_count: 2,
        };
        assert!(!row.is_inconsistent());

        row.items_total = Decimal::new(149_999, 2);
        assert!(row.is_inconsistent());
    }
}
