//! `SeaORM` Entity for the carry_forward_transfers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{Term, TransferStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "carry_forward_transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub student_id: Uuid,
    pub from_class_id: Uuid,
    pub from_academic_year_id: Uuid,
    pub from_term: Term,
    pub to_class_id: Uuid,
    pub to_academic_year_id: Uuid,
    pub to_term: Term,
    pub destination_invoice_id: Option<Uuid>,
    pub total_balance_transferred: Decimal,
    pub status: TransferStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::carry_forward_details::Entity")]
    CarryForwardDetails,
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::DestinationInvoiceId",
        to = "super::invoices::Column::Id"
    )]
    DestinationInvoice,
}

impl Related<super::carry_forward_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarryForwardDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
