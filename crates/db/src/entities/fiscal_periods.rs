//! `SeaORM` Entity for fiscal_periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub is_closed: bool,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub closed_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entries::Entity")]
    JournalEntries,
    #[sea_orm(has_many = "super::account_balances::Entity")]
    AccountBalances,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl Related<super::account_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for bukubesar_core::fiscal::FiscalPeriod {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            start_date: m.start_date,
            end_date: m.end_date,
            is_closed: m.is_closed,
        }
    }
}
