//! `SeaORM` Entity for the invoice_items table.
//!
//! Each row satisfies `amount = paid_amount + waived_amount +
//! balance_amount` (also enforced by a CHECK constraint).
//! `carried_forward_from` is a non-owning back-reference to the source
//! item of a carry-forward; the source is immutable history and is never
//! cascade-deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InvoiceItemStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub fee_structure_item_id: Option<Uuid>,
    pub name: String,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub waived_amount: Decimal,
    pub balance_amount: Decimal,
    pub status: InvoiceItemStatus,
    pub carried_forward_from: Option<Uuid>,
    pub waiver_reason: Option<String>,
    pub waiver_approved_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::CarriedForwardFrom",
        to = "Column::Id"
    )]
    SourceItem,
    #[sea_orm(has_many = "super::payment_items::Entity")]
    PaymentItems,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::payment_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
