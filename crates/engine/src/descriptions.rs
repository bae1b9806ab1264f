use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "descriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub description_id: i64,
    pub owner: String,
    pub description_name: String,
    pub active_status: bool,
    pub date_added: DateTimeUtc,
    pub date_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
