//! `SeaORM` Entity for the payment_items table.
//!
//! One row per allocation of a payment against an invoice item.
//! `item_amount_snapshot` captures the item's original amount at
//! allocation time for audit; `sequence` is the allocation order within
//! the payment. `invoice_item_id` is a non-owning reference - deleting a
//! payment item never touches the invoice item.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentItemStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_id: Uuid,
    pub invoice_item_id: Uuid,
    pub sequence: i32,
    pub amount: Decimal,
    pub item_amount_snapshot: Decimal,
    pub status: PaymentItemStatus,
    pub refund_amount: Option<Decimal>,
    pub refunded_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payments,
    #[sea_orm(
        belongs_to = "super::invoice_items::Entity",
        from = "Column::InvoiceItemId",
        to = "super::invoice_items::Column::Id"
    )]
    InvoiceItems,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::invoice_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
