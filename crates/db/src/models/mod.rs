//! Table records and insert inputs.
//!
//! Records mirror one row of their table. `New*` inputs carry what a caller
//! supplies on insert; they deserialize from the seed file format.

pub mod customer;
pub mod order;
pub mod payment;
pub mod product;
pub mod review;

pub use customer::{Customer, NewCustomer};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, PlacedOrder};
pub use payment::{NewPayment, Payment};
pub use product::{NewProduct, Product};
pub use review::{NewReview, Review};
