//! Medical billing records.
//!
//! All money columns are cents. `transaction_id` is unique when present.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "medical_expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub medical_expense_id: i64,
    pub owner: String,
    pub transaction_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub family_member_id: Option<i64>,
    pub service_date: Date,
    pub service_description: Option<String>,
    pub procedure_code: Option<String>,
    pub diagnosis_code: Option<String>,
    pub billed_amount: i64,
    pub insurance_discount: i64,
    pub insurance_paid: i64,
    pub patient_responsibility: i64,
    pub paid_amount: i64,
    pub paid_date: Option<Date>,
    pub is_out_of_network: bool,
    pub claim_number: Option<String>,
    pub claim_status: String,
    pub active_status: bool,
    pub date_added: DateTimeUtc,
    pub date_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::TransactionId",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Transaction,
    #[sea_orm(
        belongs_to = "super::family_members::Entity",
        from = "Column::FamilyMemberId",
        to = "super::family_members::Column::FamilyMemberId",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    FamilyMember,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::family_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FamilyMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
