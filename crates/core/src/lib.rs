//! Storekeep Core - Domain types and business rules.
//!
//! This crate provides the types and rules shared by all Storekeep components:
//! - `db` - `PostgreSQL` schema, repositories, and the refund workflow
//! - `cli` - Command-line tools for migrations, seeding, refunds, and reports
//!
//! # Architecture
//!
//! The core crate contains only types and pure decision functions - no I/O,
//! no database access. Repositories load rows, hand them to the rules here,
//! and persist whatever the rules decide.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, ratings, and statuses
//! - [`inventory`] - Stock adjustment when an order line item is recorded
//! - [`refund`] - Refund eligibility for an order and its payment
//! - [`reports`] - Report row types and ranking/window helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod inventory;
pub mod refund;
pub mod reports;
pub mod types;

pub use inventory::{StockChange, StockError, StockPolicy, apply_line_item};
pub use refund::{OrderLedger, PaymentLedger, RefundError, RefundPlan, plan_refund};
pub use types::*;
