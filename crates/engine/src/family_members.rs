use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "family_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub family_member_id: i64,
    pub owner: String,
    pub member_name: String,
    pub relationship: String,
    pub date_of_birth: Option<Date>,
    pub insurance_member_id: Option<String>,
    pub ssn_last_four: Option<String>,
    pub medical_record_number: Option<String>,
    pub active_status: bool,
    pub date_added: DateTimeUtc,
    pub date_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::medical_expenses::Entity")]
    MedicalExpenses,
}

impl Related<super::medical_expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MedicalExpenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
