//! `SeaORM` Entity for the payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub payment_number: String,
    pub student_id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub received_by: Option<Uuid>,
    pub received_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment_items::Entity")]
    PaymentItems,
}

impl Related<super::payment_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
