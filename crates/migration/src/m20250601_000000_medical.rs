//! Medical expense tracking.
//!
//! - `family_members`: people an expense can be attributed to
//! - `medical_expenses`: billing breakdown, optionally linked to a transaction

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum FamilyMembers {
    Table,
    FamilyMemberId,
    Owner,
    MemberName,
    Relationship,
    DateOfBirth,
    InsuranceMemberId,
    SsnLastFour,
    MedicalRecordNumber,
    ActiveStatus,
    DateAdded,
    DateUpdated,
}

#[derive(Iden)]
enum MedicalExpenses {
    Table,
    MedicalExpenseId,
    Owner,
    TransactionId,
    ProviderId,
    FamilyMemberId,
    ServiceDate,
    ServiceDescription,
    ProcedureCode,
    DiagnosisCode,
    BilledAmount,
    InsuranceDiscount,
    InsurancePaid,
    PatientResponsibility,
    PaidAmount,
    PaidDate,
    IsOutOfNetwork,
    ClaimNumber,
    ClaimStatus,
    ActiveStatus,
    DateAdded,
    DateUpdated,
}

#[derive(Iden)]
enum Transactions {
    Table,
    TransactionId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FamilyMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FamilyMembers::FamilyMemberId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FamilyMembers::Owner).string().not_null())
                    .col(
                        ColumnDef::new(FamilyMembers::MemberName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FamilyMembers::Relationship)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FamilyMembers::DateOfBirth).date())
                    .col(ColumnDef::new(FamilyMembers::InsuranceMemberId).string())
                    .col(ColumnDef::new(FamilyMembers::SsnLastFour).string())
                    .col(ColumnDef::new(FamilyMembers::MedicalRecordNumber).string())
                    .col(
                        ColumnDef::new(FamilyMembers::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(FamilyMembers::DateAdded)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FamilyMembers::DateUpdated)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-family_members-owner-member_name-unique")
                    .table(FamilyMembers::Table)
                    .col(FamilyMembers::Owner)
                    .col(FamilyMembers::MemberName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MedicalExpenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MedicalExpenses::MedicalExpenseId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MedicalExpenses::Owner).string().not_null())
                    .col(ColumnDef::new(MedicalExpenses::TransactionId).big_integer())
                    .col(ColumnDef::new(MedicalExpenses::ProviderId).big_integer())
                    .col(ColumnDef::new(MedicalExpenses::FamilyMemberId).big_integer())
                    .col(
                        ColumnDef::new(MedicalExpenses::ServiceDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MedicalExpenses::ServiceDescription).string())
                    .col(ColumnDef::new(MedicalExpenses::ProcedureCode).string())
                    .col(ColumnDef::new(MedicalExpenses::DiagnosisCode).string())
                    .col(
                        ColumnDef::new(MedicalExpenses::BilledAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MedicalExpenses::InsuranceDiscount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MedicalExpenses::InsurancePaid)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MedicalExpenses::PatientResponsibility)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MedicalExpenses::PaidAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(MedicalExpenses::PaidDate).date())
                    .col(
                        ColumnDef::new(MedicalExpenses::IsOutOfNetwork)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(MedicalExpenses::ClaimNumber).string())
                    .col(
                        ColumnDef::new(MedicalExpenses::ClaimStatus)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MedicalExpenses::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(MedicalExpenses::DateAdded)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MedicalExpenses::DateUpdated)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-medical_expenses-transaction_id")
                            .from(MedicalExpenses::Table, MedicalExpenses::TransactionId)
                            .to(Transactions::Table, Transactions::TransactionId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-medical_expenses-family_member_id")
                            .from(MedicalExpenses::Table, MedicalExpenses::FamilyMemberId)
                            .to(FamilyMembers::Table, FamilyMembers::FamilyMemberId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // One expense per transaction; NULLs don't collide in SQLite.
        manager
            .create_index(
                Index::create()
                    .name("idx-medical_expenses-transaction_id-unique")
                    .table(MedicalExpenses::Table)
                    .col(MedicalExpenses::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-medical_expenses-owner-service_date")
                    .table(MedicalExpenses::Table)
                    .col(MedicalExpenses::Owner)
                    .col(MedicalExpenses::ServiceDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MedicalExpenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FamilyMembers::Table).to_owned())
            .await?;
        Ok(())
    }
}
