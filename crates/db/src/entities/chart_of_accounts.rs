//! `SeaORM` Entity for chart_of_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::NormalBalance;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "chart_of_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub account_group_id: Uuid,
    pub normal_balance: NormalBalance,
    pub is_active: bool,
    pub is_locked: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account_groups::Entity",
        from = "Column::AccountGroupId",
        to = "super::account_groups::Column::Id"
    )]
    AccountGroups,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
    #[sea_orm(has_many = "super::journal_entry_lines::Entity")]
    JournalEntryLines,
    #[sea_orm(has_many = "super::account_balances::Entity")]
    AccountBalances,
}

impl Related<super::account_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountGroups.def()
    }
}

impl Related<super::journal_entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntryLines.def()
    }
}

impl Related<super::account_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
