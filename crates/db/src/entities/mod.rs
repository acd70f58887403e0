//! `SeaORM` entity definitions for the fee ledger.

pub mod carry_forward_details;
pub mod carry_forward_transfers;
pub mod fee_structure_items;
pub mod fee_structures;
pub mod invoice_items;
pub mod invoices;
pub mod payment_items;
pub mod payments;
pub mod sea_orm_active_enums;
