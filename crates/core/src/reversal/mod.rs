//! Reversal engine: cancellation and refund of payment allocations.
//!
//! A reversal exactly undoes a prior allocation's effect on the invoice
//! item and re-derives the parent payment's status from its items. The
//! database layer runs each reversal as one atomic unit.

pub mod error;
pub mod service;
pub mod types;

pub use error::ReversalError;
pub use service::ReversalService;
pub use types::{PaymentItemState, RefundRecord, ReversalOutcome};
