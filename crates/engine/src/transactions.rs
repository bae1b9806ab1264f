//! Transactions table.
//!
//! Enum columns (`account_type`, `transaction_state`, ...) hold the lowercase
//! wire form of the matching `api_types` enum; `amount` is in cents.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub transaction_id: i64,
    pub owner: String,
    #[sea_orm(unique)]
    pub guid: String,
    pub account_id: i64,
    pub account_type: String,
    pub transaction_type: String,
    pub account_name_owner: String,
    pub transaction_date: Date,
    pub description: String,
    pub category: String,
    pub amount: i64,
    pub transaction_state: String,
    pub reoccurring_type: String,
    pub active_status: bool,
    pub notes: String,
    pub receipt_image_id: Option<i64>,
    pub date_added: DateTimeUtc,
    pub date_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::AccountId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Account,
    #[sea_orm(has_many = "super::receipt_images::Entity")]
    ReceiptImages,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::receipt_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReceiptImages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
