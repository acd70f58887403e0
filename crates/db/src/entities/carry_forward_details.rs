//! `SeaORM` Entity for the carry_forward_details table.
//!
//! One row per fee line carried over, snapshotting the fee name, original
//! amount, and balance at time of transfer. `source_item_id` is a
//! non-owning back-reference to immutable history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "carry_forward_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub source_item_id: Uuid,
    pub new_item_id: Option<Uuid>,
    pub fee_name: String,
    pub original_amount: Decimal,
    pub balance_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::carry_forward_transfers::Entity",
        from = "Column::TransferId",
        to = "super::carry_forward_transfers::Column::Id"
    )]
    CarryForwardTransfers,
    #[sea_orm(
        belongs_to = "super::invoice_items::Entity",
        from = "Column::SourceItemId",
        to = "super::invoice_items::Column::Id"
    )]
    SourceItem,
}

impl Related<super::carry_forward_transfers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarryForwardTransfers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
