//! Product records.

use serde::{Deserialize, Serialize};

use storekeep_core::{Money, ProductId};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    /// Current list price. Line items keep their own snapshot.
    pub price: Money,
    /// Units on hand. Negative only under the backorder stock policy.
    pub stock_quantity: i32,
}

/// Input for adding a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub stock_quantity: i32,
}
