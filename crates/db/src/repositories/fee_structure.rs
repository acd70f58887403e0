//! Fee structure repository.
//!
//! Fee structures are invoice templates: one named line per fee category
//! for a (class, academic year, term) scope. Invoice creation copies the
//! amounts, so structure edits never retroactively affect issued
//! invoices.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use bursar_shared::types::{FeeStructureId, FeeStructureItemId, TermScope};

use crate::entities::{fee_structure_items, fee_structures};

/// Error types for fee structure operations.
#[derive(Debug, thiserror::Error)]
pub enum FeeStructureError {
    /// Fee structure not found.
    #[error("Fee structure not found: {0}")]
    NotFound(Uuid),

    /// A fee structure needs at least one line.
    #[error("Fee structure requires at least one item")]
    EmptyStructure,

    /// Fee amounts cannot be negative.
    #[error("Fee amount cannot be negative: {name} = {amount}")]
    NegativeAmount {
        /// The offending line name.
        name: String,
        /// The offending amount.
        amount: Decimal,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for one fee structure line.
#[derive(Debug, Clone)]
pub struct FeeStructureItemInput {
    /// Fee category name (e.g. "Tuition").
    pub name: String,
    /// Fee amount.
    pub amount: Decimal,
}

/// Input for creating a fee structure.
#[derive(Debug, Clone)]
pub struct CreateFeeStructureInput {
    /// Structure name (e.g. "Grade 4 - Term 1 2026/2027").
    pub name: String,
    /// The scope the structure applies to.
    pub scope: TermScope,
    /// The fee lines.
    pub items: Vec<FeeStructureItemInput>,
}

/// A fee structure with its lines.
#[derive(Debug, Clone)]
pub struct FeeStructureWithItems {
    /// Structure record.
    pub structure: fee_structures::Model,
    /// Lines ordered by sort order.
    pub items: Vec<fee_structure_items::Model>,
}

/// Fee structure repository.
#[derive(Debug, Clone)]
pub struct FeeStructureRepository {
    db: DatabaseConnection,
}

impl FeeStructureRepository {
    /// Creates a new fee structure repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a fee structure with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the structure has no items, any amount is
    /// negative, or a database operation fails.
    pub async fn create(
        &self,
        input: CreateFeeStructureInput,
    ) -> Result<FeeStructureWithItems, FeeStructureError> {
        if input.items.is_empty() {
            return Err(FeeStructureError::EmptyStructure);
        }
        for item in &input.items {
            if item.amount < Decimal::ZERO {
                return Err(FeeStructureError::NegativeAmount {
                    name: item.name.clone(),
                    amount: item.amount,
                });
            }
        }

        let now = Utc::now().into();
        let structure_id = FeeStructureId::new();

        let txn = self.db.begin().await?;

        let structure = fee_structures::ActiveModel {
            id: Set(structure_id.into_inner()),
            name: Set(input.name),
            class_id: Set(input.scope.class_id.into_inner()),
            academic_year_id: Set(input.scope.academic_year_id.into_inner()),
            term: Set(input.scope.term.into()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for (position, item) in input.items.into_iter().enumerate() {
            let row = fee_structure_items::ActiveModel {
                id: Set(FeeStructureItemId::new().into_inner()),
                fee_structure_id: Set(structure.id),
                name: Set(item.name),
                amount: Set(item.amount),
                sort_order: Set(i32::try_from(position).unwrap_or(i32::MAX)),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            items.push(row);
        }

        txn.commit().await?;

        Ok(FeeStructureWithItems { structure, items })
    }

    /// Fetches a fee structure with its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the structure does not exist.
    pub async fn get_with_items(
        &self,
        id: FeeStructureId,
    ) -> Result<FeeStructureWithItems, FeeStructureError> {
        let structure = fee_structures::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(FeeStructureError::NotFound(id.into_inner()))?;

        let items = fee_structure_items::Entity::find()
            .filter(fee_structure_items::Column::FeeStructureId.eq(structure.id))
            .order_by_asc(fee_structure_items::Column::SortOrder)
            .all(&self.db)
            .await?;

        Ok(FeeStructureWithItems { structure, items })
    }
}
