//! `SeaORM` Entity for the fee_structures table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Term;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fee_structures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub class_id: Uuid,
    pub academic_year_id: Uuid,
    pub term: Term,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fee_structure_items::Entity")]
    FeeStructureItems,
}

impl Related<super::fee_structure_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeeStructureItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
