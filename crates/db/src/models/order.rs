//! Order and line-item records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storekeep_core::{
    CustomerId, Money, OrderId, OrderItemId, OrderLedger, OrderStatus, ProductId,
};

/// An order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    pub total_amount: Money,
    pub order_status: OrderStatus,
}

impl Order {
    /// The columns the refund workflow decides on.
    #[must_use]
    pub const fn ledger(&self) -> OrderLedger {
        OrderLedger {
            order_id: self.order_id,
            total_amount: self.total_amount,
            status: self.order_status,
        }
    }
}

/// A line item. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub order_item_id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Price per unit at the time of sale.
    pub unit_price: Money,
}

/// Input for creating an order header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    pub total_amount: Money,
    #[serde(default)]
    pub order_status: OrderStatus,
}

/// Input for recording a line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Price per unit; the product's current price is used when absent.
    #[serde(default)]
    pub unit_price: Option<Money>,
}

/// An order together with the line items recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}
