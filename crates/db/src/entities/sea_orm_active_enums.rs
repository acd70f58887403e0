//! `SeaORM` active enums backing the Postgres enum types.
//!
//! Each enum mirrors a status type in `bursar-core` (or `Term` in
//! `bursar-shared`); the `From` impls keep the storage layer and the
//! domain layer in lockstep.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice status stored in the `invoice_status` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
pub enum InvoiceStatus {
    /// No item has any settled amount.
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Some amount is settled but a balance remains.
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    /// Every item balance is zero.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// A balance remains past the due date.
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// The invoice was cancelled (terminal).
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<bursar_core::invoice::InvoiceStatus> for InvoiceStatus {
    fn from(status: bursar_core::invoice::InvoiceStatus) -> Self {
        use bursar_core::invoice::InvoiceStatus as Core;
        match status {
            Core::Unpaid => Self::Unpaid,
            Core::PartiallyPaid => Self::PartiallyPaid,
            Core::Paid => Self::Paid,
            Core::Overdue => Self::Overdue,
            Core::Cancelled => Self::Cancelled,
        }
    }
}

impl From<InvoiceStatus> for bursar_core::invoice::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        use InvoiceStatus as Db;
        match status {
            Db::Unpaid => Self::Unpaid,
            Db::PartiallyPaid => Self::PartiallyPaid,
            Db::Paid => Self::Paid,
            Db::Overdue => Self::Overdue,
            Db::Cancelled => Self::Cancelled,
        }
    }
}

/// Invoice item status stored in the `invoice_item_status` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_item_status")]
pub enum InvoiceItemStatus {
    /// Nothing paid or waived yet.
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Some amount is settled but a balance remains.
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    /// The balance is fully settled.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// A balance remains past the due date.
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

impl From<bursar_core::invoice::InvoiceItemStatus> for InvoiceItemStatus {
    fn from(status: bursar_core::invoice::InvoiceItemStatus) -> Self {
        use bursar_core::invoice::InvoiceItemStatus as Core;
        match status {
            Core::Unpaid => Self::Unpaid,
            Core::PartiallyPaid => Self::PartiallyPaid,
            Core::Paid => Self::Paid,
            Core::Overdue => Self::Overdue,
        }
    }
}

impl From<InvoiceItemStatus> for bursar_core::invoice::InvoiceItemStatus {
    fn from(status: InvoiceItemStatus) -> Self {
        use InvoiceItemStatus as Db;
        match status {
            Db::Unpaid => Self::Unpaid,
            Db::PartiallyPaid => Self::PartiallyPaid,
            Db::Paid => Self::Paid,
            Db::Overdue => Self::Overdue,
        }
    }
}

/// Payment status stored in the `payment_status` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
pub enum PaymentStatus {
    /// Recorded but not yet allocated.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Allocation in progress.
    #[sea_orm(string_value = "processing")]
    Processing,
    /// All allocations succeeded.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Allocation failed.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Every allocation was cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Every allocation was refunded.
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl From<bursar_core::payment::PaymentStatus> for PaymentStatus {
    fn from(status: bursar_core::payment::PaymentStatus) -> Self {
        use bursar_core::payment::PaymentStatus as Core;
        match status {
            Core::Pending => Self::Pending,
            Core::Processing => Self::Processing,
            Core::Completed => Self::Completed,
            Core::Failed => Self::Failed,
            Core::Cancelled => Self::Cancelled,
            Core::Refunded => Self::Refunded,
        }
    }
}

impl From<PaymentStatus> for bursar_core::payment::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        use PaymentStatus as Db;
        match status {
            Db::Pending => Self::Pending,
            Db::Processing => Self::Processing,
            Db::Completed => Self::Completed,
            Db::Failed => Self::Failed,
            Db::Cancelled => Self::Cancelled,
            Db::Refunded => Self::Refunded,
        }
    }
}

/// Payment item status stored in the `payment_item_status` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_item_status")]
pub enum PaymentItemStatus {
    /// Planned but not yet applied.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Applied to the invoice item.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Reversed in full by cancellation.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Reversed by refund.
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl From<bursar_core::payment::PaymentItemStatus> for PaymentItemStatus {
    fn from(status: bursar_core::payment::PaymentItemStatus) -> Self {
        use bursar_core::payment::PaymentItemStatus as Core;
        match status {
            Core::Pending => Self::Pending,
            Core::Completed => Self::Completed,
            Core::Cancelled => Self::Cancelled,
            Core::Refunded => Self::Refunded,
        }
    }
}

impl From<PaymentItemStatus> for bursar_core::payment::PaymentItemStatus {
    fn from(status: PaymentItemStatus) -> Self {
        use PaymentItemStatus as Db;
        match status {
            Db::Pending => Self::Pending,
            Db::Completed => Self::Completed,
            Db::Cancelled => Self::Cancelled,
            Db::Refunded => Self::Refunded,
        }
    }
}

/// Carry-forward transfer status stored in the `transfer_status` enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transfer_status")]
pub enum TransferStatus {
    /// Recorded but not yet applied.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// All details transferred.
    #[sea_orm(string_value = "transferred")]
    Transferred,
    /// A write failed; the transfer rolled back.
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl From<bursar_core::carryforward::TransferStatus> for TransferStatus {
    fn from(status: bursar_core::carryforward::TransferStatus) -> Self {
        use bursar_core::carryforward::TransferStatus as Core;
        match status {
            Core::Pending => Self::Pending,
            Core::Transferred => Self::Transferred,
            Core::Failed => Self::Failed,
        }
    }
}

impl From<TransferStatus> for bursar_core::carryforward::TransferStatus {
    fn from(status: TransferStatus) -> Self {
        use TransferStatus as Db;
        match status {
            Db::Pending => Self::Pending,
            Db::Transferred => Self::Transferred,
            Db::Failed => Self::Failed,
        }
    }
}

/// School term stored in the `term` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "term")]
pub enum Term {
    /// First term.
    #[sea_orm(string_value = "first")]
    First,
    /// Second term.
    #[sea_orm(string_value = "second")]
    Second,
    /// Third term.
    #[sea_orm(string_value = "third")]
    Third,
}

impl From<bursar_shared::types::Term> for Term {
    fn from(term: bursar_shared::types::Term) -> Self {
        use bursar_shared::types::Term as Shared;
        match term {
            Shared::First => Self::First,
            Shared::Second => Self::Second,
            Shared::Third => Self::Third,
        }
    }
}

impl From<Term> for bursar_shared::types::Term {
    fn from(term: Term) -> Self {
        use Term as Db;
        match term {
            Db::First => Self::First,
            Db::Second => Self::Second,
            Db::Third => Self::Third,
        }
    }
}
