//! Refund command.
//!
//! ```bash
//! sk-cli refund 1
//! ```

use storekeep_core::OrderId;
use storekeep_db::OrderRepository;

/// Refund an order, marking it and its payment `Refunded`.
///
/// # Errors
///
/// Returns an error if the refund is rejected (missing order or payment,
/// already refunded, amount mismatch) or the database fails.
pub async fn run(order_id: i32) -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;

    let plan = OrderRepository::new(&pool)
        .refund(OrderId::new(order_id))
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "Refunded order {} (payment {}, amount {})",
            plan.order_id, plan.payment_id, plan.amount
        );
    }

    pool.close().await;
    Ok(())
}
