//! `SeaORM` Entity for account_balances table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub fiscal_period_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub opening_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub debit_movement: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub credit_movement: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub closing_balance: Decimal,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chart_of_accounts::Entity",
        from = "Column::AccountId",
        to = "super::chart_of_accounts::Column::Id",
        on_delete = "Cascade"
    )]
    ChartOfAccounts,
    #[sea_orm(
        belongs_to = "super::fiscal_periods::Entity",
        from = "Column::FiscalPeriodId",
        to = "super::fiscal_periods::Column::Id",
        on_delete = "Cascade"
    )]
    FiscalPeriods,
}

impl Related<super::chart_of_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChartOfAccounts.def()
    }
}

impl Related<super::fiscal_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalPeriods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for bukubesar_core::reports::StoredBalance {
    fn from(m: Model) -> Self {
        Self {
            account_id: m.account_id,
            opening_balance: m.opening_balance,
            debit_movement: m.debit_movement,
            credit_movement: m.credit_movement,
            closing_balance: m.closing_balance,
        }
    }
}
