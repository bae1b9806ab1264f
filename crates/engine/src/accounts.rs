//! Accounts table.
//!
//! `outstanding`, `future` and `cleared` are derived from the account's
//! active transactions; `validation_date` from its validation amounts.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub account_id: i64,
    pub owner: String,
    pub account_name_owner: String,
    pub account_type: String,
    pub active_status: bool,
    pub moniker: String,
    pub outstanding: i64,
    pub future: i64,
    pub cleared: i64,
    pub date_closed: Option<DateTimeUtc>,
    pub validation_date: Option<DateTimeUtc>,
    pub date_added: DateTimeUtc,
    pub date_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::validation_amounts::Entity")]
    ValidationAmounts,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::validation_amounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ValidationAmounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
