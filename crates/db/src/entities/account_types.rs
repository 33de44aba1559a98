//! `SeaORM` Entity for account_types table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::NormalBalance;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub normal_balance: NormalBalance,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_groups::Entity")]
    AccountGroups,
}

impl Related<super::account_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
