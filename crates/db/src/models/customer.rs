//! Customer records.

use serde::{Deserialize, Serialize};

use storekeep_core::{CustomerId, Email};

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name: String,
    /// Unique across customers.
    pub email: Email,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Input for registering a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
