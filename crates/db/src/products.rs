//! Database operations for the product catalog.

use sqlx::PgPool;

use storekeep_core::{Money, ProductId};

use super::{RepositoryError, map_write_error};
use crate::models::{NewProduct, Product};

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (name, price, stock_quantity)
            VALUES ($1, $2, $3)
            RETURNING product_id, name, price, stock_quantity
            ",
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock_quantity)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product"))?;

        tracing::info!(
            product_id = %product.product_id,
            stock = product.stock_quantity,
            "Added product"
        );
        Ok(product)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT product_id, name, price, stock_quantity
            FROM products
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List all products ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT product_id, name, price, stock_quantity
            FROM products
            ORDER BY product_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Change the list price. Recorded line items keep their own price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update_price(
        &self,
        id: ProductId,
        price: Money,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET price = $2
            WHERE product_id = $1
            RETURNING product_id, name, price, stock_quantity
            ",
        )
        .bind(id)
        .bind(price)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tracing::info!(product_id = %id, price = %price, "Updated product price");
        Ok(product)
    }

    /// Add `units` to a product's stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist, or
    /// `RepositoryError::Conflict` if `units` is not positive.
    pub async fn restock(&self, id: ProductId, units: i32) -> Result<Product, RepositoryError> {
        if units <= 0 {
            return Err(RepositoryError::Conflict(format!(
                "restock quantity must be positive (got {units})"
            )));
        }

        let product = sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET stock_quantity = stock_quantity + $2
            WHERE product_id = $1
            RETURNING product_id, name, price, stock_quantity
            ",
        )
        .bind(id)
        .bind(units)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tracing::info!(
            product_id = %id,
            units,
            stock = product.stock_quantity,
            "Restocked product"
        );
        Ok(product)
    }
}
