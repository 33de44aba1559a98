//! `SeaORM` Entity for journal_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::JournalStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub entry_date: Date,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub reference: Option<String>,
    pub status: JournalStatus,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_credit: Decimal,
    pub fiscal_period_id: Uuid,
    pub created_by: Uuid,
    pub posted_by: Option<Uuid>,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub reverses_entry_id: Option<Uuid>,
    pub reversed_by_entry_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fiscal_periods::Entity",
        from = "Column::FiscalPeriodId",
        to = "super::fiscal_periods::Column::Id"
    )]
    FiscalPeriods,
    #[sea_orm(has_many = "super::journal_entry_lines::Entity")]
    JournalEntryLines,
}

impl Related<super::fiscal_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalPeriods.def()
    }
}

impl Related<super::journal_entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntryLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
