//! `SeaORM` Entity for account_groups table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountCategory, NormalBalance};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub account_type_id: Uuid,
    pub normal_balance: NormalBalance,
    pub category: AccountCategory,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account_types::Entity",
        from = "Column::AccountTypeId",
        to = "super::account_types::Column::Id"
    )]
    AccountTypes,
    #[sea_orm(has_many = "super::chart_of_accounts::Entity")]
    ChartOfAccounts,
}

impl Related<super::account_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountTypes.def()
    }
}

impl Related<super::chart_of_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChartOfAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
