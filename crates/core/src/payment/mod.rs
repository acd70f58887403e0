//! Payment domain: allocation of payment events across invoice items.
//!
//! A payment is one received amount; the allocation engine splits it
//! across one or more fee lines as an all-or-nothing unit, producing one
//! payment item per target with its allocation order and audit snapshot.

pub mod allocation;
pub mod error;
pub mod types;

#[cfg(test)]
mod allocation_props;

pub use allocation::AllocationEngine;
pub use error::AllocationError;
pub use types::{
    AllocationItem, AllocationOutcome, AllocationTarget, PaymentItemStatus, PaymentStatus,
    PlannedAllocation,
};
