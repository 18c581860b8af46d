//! Payment records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storekeep_core::{Money, OrderId, PaymentId, PaymentLedger, PaymentMethod, PaymentStatus};

/// A payment against an order. At most one exists per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub payment_date: NaiveDate,
    pub payment_amount: Money,
    /// How the customer paid.
    pub payment_method: PaymentMethod,
    /// Whether the funds are still held or were returned.
    pub payment_status: PaymentStatus,
}

impl Payment {
    /// The columns the refund workflow decides on.
    #[must_use]
    pub const fn ledger(&self) -> PaymentLedger {
        PaymentLedger {
            payment_id: self.payment_id,
            order_id: self.order_id,
            amount: self.payment_amount,
            status: self.payment_status,
        }
    }
}

/// Input for recording a payment. New payments are always `Paid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub payment_date: NaiveDate,
    pub payment_amount: Money,
    pub payment_method: PaymentMethod,
}
