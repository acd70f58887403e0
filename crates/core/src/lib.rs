//! Core fee reconciliation logic for Bursar.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All ledger rules, allocation planning, and status
//! derivation live here; the `bursar-db` crate runs these engines inside
//! database transactions.
//!
//! # Modules
//!
//! - `invoice` - Invoice item ledger and invoice aggregate rules
//! - `payment` - Payment allocation engine
//! - `reversal` - Cancellation and refund of payment allocations
//! - `carryforward` - Balance carry-forward transfer planning

pub mod carryforward;
pub mod invoice;
pub mod payment;
pub mod reversal;
