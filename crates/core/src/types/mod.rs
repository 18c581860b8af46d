//! Core types for Storekeep.
//!
//! This module provides type-safe wrappers for the order-management domain.

pub mod email;
pub mod id;
pub mod money;
pub mod rating;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use rating::Rating;
pub use status::*;
