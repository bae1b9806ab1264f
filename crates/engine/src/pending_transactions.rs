//! Transactions waiting for manual review.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pending_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub pending_transaction_id: i64,
    pub owner: String,
    pub account_name_owner: String,
    pub transaction_date: Date,
    pub description: String,
    pub amount: i64,
    pub review_status: String,
    pub date_added: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
