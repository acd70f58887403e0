//! Invoice domain: item-level ledger bookkeeping and invoice aggregates.
//!
//! An invoice owns a set of fee line items. Each item keeps its own
//! paid/waived/balance bookkeeping under the three-way invariant
//! `amount = paid + waived + balance`; the invoice's totals and status
//! are derived from its items and never mutated independently.

pub mod aggregate;
pub mod error;
pub mod item;
pub mod types;

#[cfg(test)]
mod item_props;

pub use aggregate::InvoiceTotals;
pub use error::LedgerError;
pub use item::ItemLedger;
pub use types::{InvoiceItemStatus, InvoiceStatus};
