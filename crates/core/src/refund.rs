//! Refund eligibility.
//!
//! A refund is allowed only when the order's single payment matches the order
//! total exactly. [`plan_refund`] makes that decision from already-loaded rows;
//! the caller is responsible for loading them under a row lock and applying
//! the resulting [`RefundPlan`] (payment and order both marked `Refunded`) in
//! the same transaction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Money, OrderId, OrderStatus, PaymentId, PaymentStatus};

/// Business-rule failures of the refund workflow.
///
/// None of these leave any mutation behind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefundError {
    /// No order has the requested id.
    #[error("order {0} not found; refund failed")]
    OrderNotFound(OrderId),
    /// The order has no payment to refund.
    #[error("no payment recorded for order {0}; refund failed")]
    PaymentNotFound(OrderId),
    /// The order or its payment is already refunded.
    #[error("order {0} is already refunded")]
    AlreadyRefunded(OrderId),
    /// The payment does not cover the order total exactly.
    #[error(
        "payment amount mismatch; refund failed (order total {order_total}, payment {payment_amount})"
    )]
    AmountMismatch {
        /// `orders.total_amount`.
        order_total: Money,
        /// `payments.payment_amount`.
        payment_amount: Money,
    },
}

/// The refund-relevant columns of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLedger {
    pub order_id: OrderId,
    pub total_amount: Money,
    pub status: OrderStatus,
}

/// The refund-relevant columns of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLedger {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub amount: Money,
    pub status: PaymentStatus,
}

/// An approved refund: both rows are to be marked `Refunded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundPlan {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub amount: Money,
}

impl RefundPlan {
    /// Status the order moves to.
    pub const ORDER_STATUS: OrderStatus = OrderStatus::Refunded;
    /// Status the payment moves to.
    pub const PAYMENT_STATUS: PaymentStatus = PaymentStatus::Refunded;
}

/// Decide whether `order` can be refunded against `payment`.
///
/// Amounts are compared exactly; there is no tolerance.
///
/// # Errors
///
/// - [`RefundError::PaymentNotFound`] if `payment` is `None` or belongs to
///   another order
/// - [`RefundError::AlreadyRefunded`] if either row is already refunded
/// - [`RefundError::AmountMismatch`] if the amounts differ
pub fn plan_refund(
    order: &OrderLedger,
    payment: Option<&PaymentLedger>,
) -> Result<RefundPlan, RefundError> {
    let payment = payment
        .filter(|p| p.order_id == order.order_id)
        .ok_or(RefundError::PaymentNotFound(order.order_id))?;

    if order.status == OrderStatus::Refunded || payment.status == PaymentStatus::Refunded {
        return Err(RefundError::AlreadyRefunded(order.order_id));
    }

    if payment.amount != order.total_amount {
        return Err(RefundError::AmountMismatch {
            order_total: order.total_amount,
            payment_amount: payment.amount,
        });
    }

    Ok(RefundPlan {
        order_id: order.order_id,
        payment_id: payment.payment_id,
        amount: payment.amount,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn order(id: i32, total: &str, status: OrderStatus) -> OrderLedger {
        OrderLedger {
            order_id: OrderId::new(id),
            total_amount: money(total),
            status,
        }
    }

    fn payment(order_id: i32, amount: &str, status: PaymentStatus) -> PaymentLedger {
        PaymentLedger {
            payment_id: PaymentId::new(100 + order_id),
            order_id: OrderId::new(order_id),
            amount: money(amount),
            status,
        }
    }

    #[test]
    fn test_matching_payment_is_refunded() {
        let o = order(1, "1500.00", OrderStatus::Completed);
        let p = payment(1, "1500.00", PaymentStatus::Paid);

        let plan = plan_refund(&o, Some(&p)).unwrap();
        assert_eq!(plan.order_id, OrderId::new(1));
        assert_eq!(plan.payment_id, PaymentId::new(101));
        assert_eq!(plan.amount, money("1500"));
    }

    #[test]
    fn test_pending_order_can_be_refunded() {
        let o = order(3, "20.00", OrderStatus::Pending);
        let p = payment(3, "20", PaymentStatus::Paid);
        assert!(plan_refund(&o, Some(&p)).is_ok());
    }

    #[test]
    fn test_underpayment_is_a_mismatch() {
        let o = order(2, "650.00", OrderStatus::Pending);
        let p = payment(2, "500.00", PaymentStatus::Paid);

        let err = plan_refund(&o, Some(&p)).unwrap_err();
        assert_eq!(
            err,
            RefundError::AmountMismatch {
                order_total: money("650.00"),
                payment_amount: money("500.00"),
            }
        );
        assert!(err.to_string().starts_with("payment amount mismatch; refund failed"));
    }

    #[test]
    fn test_one_cent_off_is_a_mismatch() {
        let o = order(4, "100.00", OrderStatus::Completed);
        let p = payment(4, "100.01", PaymentStatus::Paid);
        assert!(matches!(
            plan_refund(&o, Some(&p)),
            Err(RefundError::AmountMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_payment() {
        let o = order(5, "10.00", OrderStatus::Pending);
        assert_eq!(
            plan_refund(&o, None),
            Err(RefundError::PaymentNotFound(OrderId::new(5)))
        );
    }

    #[test]
    fn test_payment_for_another_order_is_ignored() {
        let o = order(6, "10.00", OrderStatus::Pending);
        let p = payment(7, "10.00", PaymentStatus::Paid);
        assert_eq!(
            plan_refund(&o, Some(&p)),
            Err(RefundError::PaymentNotFound(OrderId::new(6)))
        );
    }

    #[test]
    fn test_second_refund_is_rejected() {
        let o = order(1, "1500.00", OrderStatus::Refunded);
        let p = payment(1, "1500.00", PaymentStatus::Refunded);
        assert_eq!(
            plan_refund(&o, Some(&p)),
            Err(RefundError::AlreadyRefunded(OrderId::new(1)))
        );

        // Either side being refunded is enough.
        let o = order(1, "1500.00", OrderStatus::Completed);
        assert_eq!(
            plan_refund(&o, Some(&p)),
            Err(RefundError::AlreadyRefunded(OrderId::new(1)))
        );
    }
}
