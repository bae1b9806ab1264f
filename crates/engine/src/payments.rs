//! Payments from a debit account to a credit (or debit) account.
//!
//! Each row owns the two transactions named by `guid_source` and
//! `guid_destination`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub payment_id: i64,
    pub owner: String,
    pub source_account: String,
    pub destination_account: String,
    pub transaction_date: Date,
    pub amount: i64,
    pub guid_source: String,
    pub guid_destination: String,
    pub active_status: bool,
    pub date_added: DateTimeUtc,
    pub date_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
