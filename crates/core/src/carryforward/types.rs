//! Carry-forward domain types.

use bursar_shared::types::{InvoiceItemId, Money};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a carry-forward transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Transfer recorded but not yet applied.
    Pending,
    /// All details transferred to the destination invoice.
    Transferred,
    /// A detail write failed; the whole transfer was rolled back.
    Failed,
}

impl TransferStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Transferred => "transferred",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "transferred" => Some(Self::Transferred),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One source fee line considered for carry-forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    /// The source invoice item.
    pub item_id: InvoiceItemId,
    /// The fee name (e.g. "Tuition").
    pub fee_name: String,
    /// The item's original amount.
    pub amount: Money,
    /// The item's outstanding balance.
    pub balance: Money,
}

/// Snapshot of one carried-over fee line, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryForwardDetail {
    /// The originating invoice item (non-owning back-reference).
    pub source_item_id: InvoiceItemId,
    /// Fee name at time of transfer.
    pub fee_name: String,
    /// Original fee amount at time of transfer.
    pub original_amount: Money,
    /// Balance at time of transfer.
    pub balance_amount: Money,
}

/// Input for one new fee line on the destination invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarriedItemInput {
    /// Fee name carried over from the source line.
    pub fee_name: String,
    /// The new line's full obligation (the old balance).
    pub amount: Money,
    /// The originating item (non-owning back-reference).
    pub carried_forward_from: InvoiceItemId,
}

/// A complete carry-forward plan: details to record, items to create,
/// and the transfer total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarryForwardPlan {
    /// One detail per unpaid source line.
    pub details: Vec<CarryForwardDetail>,
    /// One new destination fee line per detail.
    pub new_items: Vec<CarriedItemInput>,
    /// Sum of transferred balances.
    pub total_balance_transferred: Money,
    /// Resulting transfer status.
    pub status: TransferStatus,
}

impl CarryForwardPlan {
    /// Returns true if the student had no outstanding balance: the
    /// transfer records zero details and still completes.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.details.is_empty()
    }
}
