//! Balance carry-forward: moving unpaid balances across terms.
//!
//! At a term or class transition, a student's outstanding invoice-item
//! balances are snapshotted into transfer details and re-issued as fresh
//! fee lines on the destination term's invoice.

pub mod service;
pub mod types;

pub use service::CarryForwardPlanner;
pub use types::{CarriedItemInput, CarryForwardDetail, CarryForwardPlan, SourceItem, TransferStatus};
