//! Stock adjustment for recorded order line items.
//!
//! Every `order_items` insert decrements `products.stock_quantity` by the line
//! quantity, inside the same transaction as the insert. What happens when the
//! product does not have enough stock is an explicit [`StockPolicy`]:
//!
//! | Policy      | stock 5, quantity 8 |
//! |-------------|---------------------|
//! | `Reject`    | error, nothing written |
//! | `Clamp`     | stock becomes 0, shortfall 3 |
//! | `Backorder` | stock becomes -3, shortfall 3 |

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::UnknownVariant;

/// What to do when a line item asks for more units than are in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StockPolicy {
    /// Fail the insert.
    #[default]
    Reject,
    /// Accept the insert and floor stock at zero.
    Clamp,
    /// Accept the insert and let stock go negative.
    Backorder,
}

impl StockPolicy {
    /// Configuration string for this policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Clamp => "clamp",
            Self::Backorder => "backorder",
        }
    }
}

impl fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockPolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "clamp" => Ok(Self::Clamp),
            "backorder" => Ok(Self::Backorder),
            _ => Err(UnknownVariant {
                kind: "stock policy",
                value: s.to_owned(),
            }),
        }
    }
}

/// Errors from applying a line item to a product's stock.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockError {
    /// Line quantities must be positive.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i32),
    /// The product cannot cover the line under [`StockPolicy::Reject`].
    #[error("insufficient stock: requested {requested}, available {available}")]
    Insufficient {
        /// Units on the line item.
        requested: i32,
        /// Units in stock before the line item.
        available: i32,
    },
    /// The new level does not fit the stock column.
    #[error("stock level overflow: {current} - {quantity}")]
    Overflow {
        /// Units in stock before the line item.
        current: i32,
        /// Units on the line item.
        quantity: i32,
    },
}

/// Outcome of applying a line item to a product's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    /// Stock before the line item.
    pub previous: i32,
    /// Stock to persist.
    pub new_level: i32,
    /// Units on the line item that were not covered by stock on hand.
    pub shortfall: i32,
}

impl StockChange {
    /// Units actually removed from stock.
    #[must_use]
    pub const fn decrement(&self) -> i32 {
        self.previous - self.new_level
    }
}

/// Compute the stock level after recording a line item of `quantity` units.
///
/// # Errors
///
/// - [`StockError::InvalidQuantity`] if `quantity` is zero or negative
/// - [`StockError::Insufficient`] if the policy is `Reject` and `quantity`
///   exceeds `current`
/// - [`StockError::Overflow`] if a backorder would underflow `i32`
pub fn apply_line_item(
    current: i32,
    quantity: i32,
    policy: StockPolicy,
) -> Result<StockChange, StockError> {
    if quantity <= 0 {
        return Err(StockError::InvalidQuantity(quantity));
    }

    let on_hand = current.max(0);
    let shortfall = quantity.saturating_sub(on_hand).max(0);

    let new_level = match policy {
        StockPolicy::Reject if quantity > current => {
            return Err(StockError::Insufficient {
                requested: quantity,
                available: current,
            });
        }
        StockPolicy::Reject | StockPolicy::Backorder => current
            .checked_sub(quantity)
            .ok_or(StockError::Overflow { current, quantity })?,
        // Never raises stock that is already below zero.
        StockPolicy::Clamp => current.saturating_sub(quantity).max(current.min(0)),
    };

    Ok(StockChange {
        previous: current,
        new_level,
        shortfall,
    })
}
