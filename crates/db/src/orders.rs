//! Database operations for orders, line items, and refunds.
//!
//! Recording line items and refunding an order are the multi-row writes in
//! the store. Each runs in one transaction. Row locks are always taken order
//! row first, then products in ascending `product_id` or the payment, so
//! concurrent callers serialize instead of deadlocking.

use sqlx::{PgConnection, PgPool};

use storekeep_core::{
    CustomerId, Money, OrderId, OrderStatus, RefundError, RefundPlan, StockPolicy, apply_line_item,
    plan_refund,
};

use super::{RepositoryError, map_write_error};
use crate::models::{NewOrder, NewOrderItem, Order, OrderItem, Payment, PlacedOrder};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Locked product columns needed to price and stock a line item.
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    price: Money,
    stock_quantity: i32,
}

// =============================================================================
// OrderRepository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
    stock_policy: StockPolicy,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository using the default stock policy.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            stock_policy: StockPolicy::Reject,
        }
    }

    /// Use `policy` when a line item exceeds the stock on hand.
    #[must_use]
    pub const fn with_stock_policy(mut self, policy: StockPolicy) -> Self {
        self.stock_policy = policy;
        self
    }

    /// The stock policy applied by [`OrderRepository::add_item`].
    #[must_use]
    pub const fn stock_policy(&self) -> StockPolicy {
        self.stock_policy
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get an order header by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT order_id, customer_id, order_date, total_amount, order_status
            FROM orders
            WHERE order_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// List a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT order_id, customer_id, order_date, total_amount, order_status
            FROM orders
            WHERE customer_id = $1
            ORDER BY order_date DESC, order_id DESC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Get the line items of an order in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT order_item_id, order_id, product_id, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY order_item_id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create an order header without line items.
    ///
    /// `total_amount` is stored as given; it is not derived from the items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::MissingReference` if the customer doesn't exist.
    pub async fn create(&self, input: &NewOrder) -> Result<Order, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let order = insert_order(&mut conn, input).await?;

        tracing::info!(
            order_id = %order.order_id,
            customer_id = %order.customer_id,
            total = %order.total_amount,
            "Created order"
        );
        Ok(order)
    }

    /// Record a line item and decrement the product's stock.
    ///
    /// The product row is locked for the duration of the transaction. If
    /// `unit_price` is absent the product's current price is snapshotted.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` if the order doesn't exist
    /// - `RepositoryError::MissingReference` if the product doesn't exist
    /// - `RepositoryError::Conflict` if the order is already refunded
    /// - `RepositoryError::Stock` if the stock policy rejects the quantity
    pub async fn add_item(
        &self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<OrderItem, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let recorded = insert_item(&mut tx, self.stock_policy(), order_id, item).await?;
        tx.commit().await?;
        Ok(recorded)
    }

    /// Create an order header and all of its line items atomically.
    ///
    /// If any item is rejected, nothing is written. All of the order's
    /// products are locked up front in ascending ID order; items are then
    /// recorded in the order given.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`OrderRepository::create`] or
    /// [`OrderRepository::add_item`].
    #[tracing::instrument(skip(self, input, items), fields(customer_id = %input.customer_id, items = items.len()))]
    pub async fn place_order(
        &self,
        input: &NewOrder,
        items: &[NewOrderItem],
    ) -> Result<PlacedOrder, RepositoryError> {
        let policy = self.stock_policy();
        let mut tx = self.pool.begin().await?;

        lock_products(&mut tx, items).await?;
        let order = insert_order(&mut tx, input).await?;
        let mut recorded = Vec::with_capacity(items.len());
        for item in items {
            recorded.push(insert_item(&mut tx, policy, order.order_id, item).await?);
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.order_id,
            total = %order.total_amount,
            items = recorded.len(),
            "Placed order"
        );
        Ok(PlacedOrder {
            order,
            items: recorded,
        })
    }

    /// Move an order between `Pending` and `Completed`.
    ///
    /// `Refunded` is reachable only through [`OrderRepository::refund`] and is
    /// terminal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist, or
    /// `RepositoryError::Conflict` if the transition is not allowed.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        if status == OrderStatus::Refunded {
            return Err(RepositoryError::Conflict(
                "orders are refunded through the refund workflow".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let current = lock_order(&mut tx, order_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        if current.order_status.is_terminal() {
            return Err(RepositoryError::Conflict(format!(
                "order {order_id} is {}",
                current.order_status
            )));
        }

        let order = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders
            SET order_status = $2
            WHERE order_id = $1
            RETURNING order_id, customer_id, order_date, total_amount, order_status
            ",
        )
        .bind(order_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, status = %status, "Updated order status");
        Ok(order)
    }

    /// Refund an order whose payment matches its total exactly.
    ///
    /// Locks the order and its payment, then marks both `Refunded` in one
    /// transaction. On any error nothing is changed.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Refund` with [`RefundError::OrderNotFound`],
    ///   [`RefundError::PaymentNotFound`], [`RefundError::AlreadyRefunded`], or
    ///   [`RefundError::AmountMismatch`]
    /// - `RepositoryError::Database` if a query fails
    #[tracing::instrument(skip(self), fields(order_id = %order_id))]
    pub async fn refund(&self, order_id: OrderId) -> Result<RefundPlan, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = lock_order(&mut tx, order_id)
            .await?
            .ok_or(RefundError::OrderNotFound(order_id))?;

        let payment = sqlx::query_as::<_, Payment>(
            r"
            SELECT payment_id, order_id, payment_date, payment_amount,
                   payment_method, payment_status
            FROM payments
            WHERE order_id = $1
            FOR UPDATE
            ",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;

        let payment_ledger = payment.as_ref().map(Payment::ledger);
        let plan = plan_refund(&order.ledger(), payment_ledger.as_ref()).inspect_err(|e| {
            tracing::warn!(error = %e, "Refund rejected");
        })?;

        sqlx::query("UPDATE payments SET payment_status = $2 WHERE payment_id = $1")
            .bind(plan.payment_id)
            .bind(RefundPlan::PAYMENT_STATUS)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE orders SET order_status = $2 WHERE order_id = $1")
            .bind(plan.order_id)
            .bind(RefundPlan::ORDER_STATUS)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            payment_id = %plan.payment_id,
            amount = %plan.amount,
            "Refunded order"
        );
        Ok(plan)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

async fn insert_order(conn: &mut PgConnection, input: &NewOrder) -> Result<Order, RepositoryError> {
    sqlx::query_as::<_, Order>(
        r"
        INSERT INTO orders (customer_id, order_date, total_amount, order_status)
        VALUES ($1, $2, $3, $4)
        RETURNING order_id, customer_id, order_date, total_amount, order_status
        ",
    )
    .bind(input.customer_id)
    .bind(input.order_date)
    .bind(input.total_amount)
    .bind(input.order_status)
    .fetch_one(conn)
    .await
    .map_err(|e| map_write_error(e, "order"))
}

async fn lock_order(
    conn: &mut PgConnection,
    order_id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(
        r"
        SELECT order_id, customer_id, order_date, total_amount, order_status
        FROM orders
        WHERE order_id = $1
        FOR UPDATE
        ",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;

    Ok(order)
}

/// Lock every product named in `items`, lowest ID first.
///
/// Unknown IDs are skipped here and reported by [`insert_item`].
async fn lock_products(
    conn: &mut PgConnection,
    items: &[NewOrderItem],
) -> Result<(), RepositoryError> {
    let mut ids: Vec<i32> = items.iter().map(|item| item.product_id.as_i32()).collect();
    ids.sort_unstable();
    ids.dedup();

    sqlx::query(
        r"
        SELECT product_id
        FROM products
        WHERE product_id = ANY($1)
        ORDER BY product_id
        FOR UPDATE
        ",
    )
    .bind(ids.as_slice())
    .execute(conn)
    .await?;

    Ok(())
}

/// Insert one line item and apply its stock change on `conn`.
async fn insert_item(
    conn: &mut PgConnection,
    policy: StockPolicy,
    order_id: OrderId,
    item: &NewOrderItem,
) -> Result<OrderItem, RepositoryError> {
    let status = sqlx::query_scalar::<_, OrderStatus>(
        "SELECT order_status FROM orders WHERE order_id = $1 FOR SHARE",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;
    if status.is_terminal() {
        return Err(RepositoryError::Conflict(format!(
            "order {order_id} is {status}; no items can be added"
        )));
    }

    let stock = sqlx::query_as::<_, StockRow>(
        "SELECT price, stock_quantity FROM products WHERE product_id = $1 FOR UPDATE",
    )
    .bind(item.product_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| RepositoryError::MissingReference(format!("product {}", item.product_id)))?;

    let change = apply_line_item(stock.stock_quantity, item.quantity, policy).inspect_err(|e| {
        tracing::warn!(
            order_id = %order_id,
            product_id = %item.product_id,
            policy = %policy,
            error = %e,
            "Line item rejected"
        );
    })?;

    let recorded = sqlx::query_as::<_, OrderItem>(
        r"
        INSERT INTO order_items (order_id, product_id, quantity, unit_price)
        VALUES ($1, $2, $3, $4)
        RETURNING order_item_id, order_id, product_id, quantity, unit_price
        ",
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price.unwrap_or(stock.price))
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "order item"))?;

    sqlx::query("UPDATE products SET stock_quantity = $2 WHERE product_id = $1")
        .bind(item.product_id)
        .bind(change.new_level)
        .execute(&mut *conn)
        .await?;

    if change.shortfall > 0 {
        tracing::warn!(
            product_id = %item.product_id,
            shortfall = change.shortfall,
            stock = change.new_level,
            policy = %policy,
            "Line item exceeded stock on hand"
        );
    }
    tracing::info!(
        order_item_id = %recorded.order_item_id,
        order_id = %order_id,
        product_id = %item.product_id,
        quantity = item.quantity,
        decrement = change.decrement(),
        stock = change.new_level,
        "Recorded line item"
    );
    Ok(recorded)
}
