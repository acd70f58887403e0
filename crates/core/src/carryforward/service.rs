//! Carry-forward planning.
//!
//! Pure planning over the source invoice's read-only balance view; the
//! database layer persists the plan (transfer, details, new items) in one
//! transaction.

use bursar_shared::types::Money;

use super::types::{
    CarriedItemInput, CarryForwardDetail, CarryForwardPlan, SourceItem, TransferStatus,
};

/// Stateless planner for balance carry-forward transfers.
pub struct CarryForwardPlanner;

impl CarryForwardPlanner {
    /// Builds the carry-forward plan for a student's source fee lines.
    ///
    /// Lines with no outstanding balance are skipped. Each remaining line
    /// yields one audit detail and one destination fee line whose full
    /// obligation is the old balance (`amount = balance`, `paid = 0`,
    /// `waived = 0`), back-referencing the source item.
    ///
    /// A student with nothing outstanding produces an empty plan with
    /// status `Transferred` - a no-op transfer, not an error.
    #[must_use]
    pub fn plan(source_items: &[SourceItem]) -> CarryForwardPlan {
        let outstanding: Vec<_> = source_items
            .iter()
            .filter(|item| item.balance.is_positive())
            .collect();

        let details: Vec<CarryForwardDetail> = outstanding
            .iter()
            .map(|item| CarryForwardDetail {
                source_item_id: item.item_id,
                fee_name: item.fee_name.clone(),
                original_amount: item.amount,
                balance_amount: item.balance,
            })
            .collect();

        let new_items: Vec<CarriedItemInput> = outstanding
            .iter()
            .map(|item| CarriedItemInput {
                fee_name: item.fee_name.clone(),
                amount: item.balance,
                carried_forward_from: item.item_id,
            })
            .collect();

        let total_balance_transferred: Money =
            details.iter().map(|detail| detail.balance_amount).sum();

        CarryForwardPlan {
            details,
            new_items,
            total_balance_transferred,
            status: TransferStatus::Transferred,
        }
    }
}
