//! Initial schema migration.
//!
//! - `users`: authentication
//! - `accounts`: credit/debit accounts with derived totals
//! - `categories`, `descriptions`, `parameters`: per-owner registries
//! - `transactions`: account activity
//! - `payments`, `transfers`: paired transactions between accounts
//! - `pending_transactions`: entries awaiting review
//! - `receipt_images`: images attached to transactions
//! - `validation_amounts`: balance checkpoints driving `validation_date`

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    UserId,
    Username,
    Password,
    FirstName,
    LastName,
    ActiveStatus,
    DateAdded,
    DateUpdated,
}

#[derive(Iden)]
enum Accounts {
    Table,
    AccountId,
    Owner,
    AccountNameOwner,
    AccountType,
    ActiveStatus,
    Moniker,
    Outstanding,
    Future,
    Cleared,
    DateClosed,
    ValidationDate,
    DateAdded,
    DateUpdated,
}

#[derive(Iden)]
enum Categories {
    Table,
    CategoryId,
    Owner,
    CategoryName,
    ActiveStatus,
    DateAdded,
    DateUpdated,
}

#[derive(Iden)]
enum Descriptions {
    Table,
    DescriptionId,
    Owner,
    DescriptionName,
    ActiveStatus,
    DateAdded,
    DateUpdated,
}

#[derive(Iden)]
enum Parameters {
    Table,
    ParameterId,
    Owner,
    ParameterName,
    ParameterValue,
    ActiveStatus,
    DateAdded,
    DateUpdated,
}

#[derive(Iden)]
enum Transactions {
    Table,
    TransactionId,
    Owner,
    Guid,
    AccountId,
    AccountType,
    TransactionType,
    AccountNameOwner,
    TransactionDate,
    Description,
    Category,
    Amount,
    TransactionState,
    ReoccurringType,
    ActiveStatus,
    Notes,
    ReceiptImageId,
    DateAdded,
    DateUpdated,
}

/// `payments` and `transfers` share one shape.
#[derive(Iden)]
enum Payments {
    Table,
    PaymentId,
}

#[derive(Iden)]
enum Transfers {
    Table,
    TransferId,
}

#[derive(Iden)]
enum PairedColumns {
    Owner,
    SourceAccount,
    DestinationAccount,
    TransactionDate,
    Amount,
    GuidSource,
    GuidDestination,
    ActiveStatus,
    DateAdded,
    DateUpdated,
}

#[derive(Iden)]
enum PendingTransactions {
    Table,
    PendingTransactionId,
    Owner,
    AccountNameOwner,
    TransactionDate,
    Description,
    Amount,
    ReviewStatus,
    DateAdded,
}

#[derive(Iden)]
enum ReceiptImages {
    Table,
    ReceiptImageId,
    Owner,
    TransactionId,
    Image,
    Thumbnail,
    ImageFormatType,
    ActiveStatus,
    DateAdded,
    DateUpdated,
}

#[derive(Iden)]
enum ValidationAmounts {
    Table,
    ValidationId,
    Owner,
    AccountId,
    ValidationDate,
    TransactionState,
    Amount,
    ActiveStatus,
    DateAdded,
    DateUpdated,
}

fn id_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn audit_columns<T: IntoIden, U: IntoIden>(added: T, updated: U) -> [ColumnDef; 2] {
    [
        ColumnDef::new(added).timestamp().not_null().to_owned(),
        ColumnDef::new(updated).timestamp().not_null().to_owned(),
    ]
}

fn paired_table<T: IntoIden + 'static, U: IntoIden + 'static>(
    table: T,
    id: U,
) -> TableCreateStatement {
    let [added, updated] =
        audit_columns(PairedColumns::DateAdded, PairedColumns::DateUpdated);
    Table::create()
        .table(table)
        .if_not_exists()
        .col(id_column(id))
        .col(ColumnDef::new(PairedColumns::Owner).string().not_null())
        .col(
            ColumnDef::new(PairedColumns::SourceAccount)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(PairedColumns::DestinationAccount)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(PairedColumns::TransactionDate)
                .date()
                .not_null(),
        )
        .col(ColumnDef::new(PairedColumns::Amount).big_integer().not_null())
        .col(ColumnDef::new(PairedColumns::GuidSource).string().not_null())
        .col(
            ColumnDef::new(PairedColumns::GuidDestination)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(PairedColumns::ActiveStatus)
                .boolean()
                .not_null()
                .default(true),
        )
        .col(added)
        .col(updated)
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        let [added, updated] = audit_columns(Users::DateAdded, Users::DateUpdated);
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id_column(Users::UserId))
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Users::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(added)
                    .col(updated)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Accounts
        // ───────────────────────────────────────────────────────────────────
        let [added, updated] = audit_columns(Accounts::DateAdded, Accounts::DateUpdated);
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(id_column(Accounts::AccountId))
                    .col(ColumnDef::new(Accounts::Owner).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::AccountNameOwner)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accounts::AccountType).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Accounts::Moniker)
                            .string()
                            .not_null()
                            .default("0000"),
                    )
                    .col(
                        ColumnDef::new(Accounts::Outstanding)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::Future)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::Cleared)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::DateClosed).timestamp())
                    .col(ColumnDef::new(Accounts::ValidationDate).timestamp())
                    .col(added)
                    .col(updated)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-owner-account_name_owner-unique")
                    .table(Accounts::Table)
                    .col(Accounts::Owner)
                    .col(Accounts::AccountNameOwner)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Categories / Descriptions / Parameters
        // ───────────────────────────────────────────────────────────────────
        let [added, updated] = audit_columns(Categories::DateAdded, Categories::DateUpdated);
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(id_column(Categories::CategoryId))
                    .col(ColumnDef::new(Categories::Owner).string().not_null())
                    .col(ColumnDef::new(Categories::CategoryName).string().not_null())
                    .col(
                        ColumnDef::new(Categories::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(added)
                    .col(updated)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-owner-category_name-unique")
                    .table(Categories::Table)
                    .col(Categories::Owner)
                    .col(Categories::CategoryName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let [added, updated] =
            audit_columns(Descriptions::DateAdded, Descriptions::DateUpdated);
        manager
            .create_table(
                Table::create()
                    .table(Descriptions::Table)
                    .if_not_exists()
                    .col(id_column(Descriptions::DescriptionId))
                    .col(ColumnDef::new(Descriptions::Owner).string().not_null())
                    .col(
                        ColumnDef::new(Descriptions::DescriptionName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Descriptions::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(added)
                    .col(updated)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-descriptions-owner-description_name-unique")
                    .table(Descriptions::Table)
                    .col(Descriptions::Owner)
                    .col(Descriptions::DescriptionName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let [added, updated] = audit_columns(Parameters::DateAdded, Parameters::DateUpdated);
        manager
            .create_table(
                Table::create()
                    .table(Parameters::Table)
                    .if_not_exists()
                    .col(id_column(Parameters::ParameterId))
                    .col(ColumnDef::new(Parameters::Owner).string().not_null())
                    .col(
                        ColumnDef::new(Parameters::ParameterName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Parameters::ParameterValue)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Parameters::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(added)
                    .col(updated)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-parameters-owner-parameter_name-unique")
                    .table(Parameters::Table)
                    .col(Parameters::Owner)
                    .col(Parameters::ParameterName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transactions
        // ───────────────────────────────────────────────────────────────────
        let [added, updated] =
            audit_columns(Transactions::DateAdded, Transactions::DateUpdated);
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(id_column(Transactions::TransactionId))
                    .col(ColumnDef::new(Transactions::Owner).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::Guid)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::AccountType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::AccountNameOwner)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::TransactionDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string().not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::TransactionState)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::ReoccurringType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Transactions::Notes)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Transactions::ReceiptImageId).big_integer())
                    .col(added)
                    .col(updated)
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::AccountId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-owner-account_name_owner")
                    .table(Transactions::Table)
                    .col(Transactions::Owner)
                    .col(Transactions::AccountNameOwner)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Payments / Transfers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(paired_table(Payments::Table, Payments::PaymentId))
            .await?;
        manager
            .create_table(paired_table(Transfers::Table, Transfers::TransferId))
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Pending transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PendingTransactions::Table)
                    .if_not_exists()
                    .col(id_column(PendingTransactions::PendingTransactionId))
                    .col(
                        ColumnDef::new(PendingTransactions::Owner)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::AccountNameOwner)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::TransactionDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::ReviewStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(PendingTransactions::DateAdded)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Receipt images
        // ───────────────────────────────────────────────────────────────────
        let [added, updated] =
            audit_columns(ReceiptImages::DateAdded, ReceiptImages::DateUpdated);
        manager
            .create_table(
                Table::create()
                    .table(ReceiptImages::Table)
                    .if_not_exists()
                    .col(id_column(ReceiptImages::ReceiptImageId))
                    .col(ColumnDef::new(ReceiptImages::Owner).string().not_null())
                    .col(
                        ColumnDef::new(ReceiptImages::TransactionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReceiptImages::Image).blob().not_null())
                    .col(ColumnDef::new(ReceiptImages::Thumbnail).blob().not_null())
                    .col(
                        ColumnDef::new(ReceiptImages::ImageFormatType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReceiptImages::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(added)
                    .col(updated)
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-receipt_images-transaction_id")
                            .from(ReceiptImages::Table, ReceiptImages::TransactionId)
                            .to(Transactions::Table, Transactions::TransactionId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Validation amounts
        // ───────────────────────────────────────────────────────────────────
        let [added, updated] =
            audit_columns(ValidationAmounts::DateAdded, ValidationAmounts::DateUpdated);
        manager
            .create_table(
                Table::create()
                    .table(ValidationAmounts::Table)
                    .if_not_exists()
                    .col(id_column(ValidationAmounts::ValidationId))
                    .col(
                        ColumnDef::new(ValidationAmounts::Owner)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationAmounts::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationAmounts::ValidationDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationAmounts::TransactionState)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationAmounts::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationAmounts::ActiveStatus)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(added)
                    .col(updated)
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-validation_amounts-account_id")
                            .from(ValidationAmounts::Table, ValidationAmounts::AccountId)
                            .to(Accounts::Table, Accounts::AccountId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-validation_amounts-account_id")
                    .table(ValidationAmounts::Table)
                    .col(ValidationAmounts::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ValidationAmounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReceiptImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PendingTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parameters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Descriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
