//! Wire types shared by the server and its clients.
//!
//! JSON field names are camelCase, enum values are lowercase snake_case and
//! monetary values are [`Amount`]s.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use money::{Amount, AmountError};

mod money;

/// Returned when a stored or submitted enum value is unknown.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a wire enum together with its canonical string form.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Returns the canonical string stored in the database.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $label,
                        value: value.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    AccountType ("account type") {
        Credit => "credit",
        Debit => "debit",
        Undefined => "undefined",
    }
}

wire_enum! {
    TransactionState ("transaction state") {
        Cleared => "cleared",
        Outstanding => "outstanding",
        Future => "future",
        Undefined => "undefined",
    }
}

wire_enum! {
    TransactionType ("transaction type") {
        Expense => "expense",
        Income => "income",
        Transfer => "transfer",
        Undefined => "undefined",
    }
}

wire_enum! {
    /// How often a transaction repeats.
    ReoccurringType ("reoccurring type") {
        Monthly => "monthly",
        Annually => "annually",
        BiAnnually => "bi_annually",
        FortNightly => "fort_nightly",
        Quarterly => "quarterly",
        Onetime => "onetime",
        Undefined => "undefined",
    }
}

wire_enum! {
    ImageFormatType ("image format") {
        Jpeg => "jpeg",
        Png => "png",
        Undefined => "undefined",
    }
}

wire_enum! {
    ClaimStatus ("claim status") {
        Submitted => "submitted",
        Processing => "processing",
        Approved => "approved",
        Denied => "denied",
        Paid => "paid",
        Closed => "closed",
    }
}

wire_enum! {
    FamilyRelationship ("relationship") {
        SelfMember => "self",
        Spouse => "spouse",
        Child => "child",
        Dependent => "dependent",
        Other => "other",
    }
}

impl Default for ReoccurringType {
    fn default() -> Self {
        Self::Undefined
    }
}

impl Default for TransactionType {
    fn default() -> Self {
        Self::Undefined
    }
}

/// Query string for rename/merge operations (`?old=…&new=…`).
#[derive(Debug, Serialize, Deserialize)]
pub struct RenameQuery {
    pub old: String,
    pub new: String,
}

/// Query string for inclusive date ranges (`?startDate=…&endDate=…`).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RegisterRequest {
        pub username: String,
        pub password: String,
        pub first_name: String,
        pub last_name: String,
    }

    /// A user as seen by clients. The password hash never leaves the server.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub user_id: i64,
        pub username: String,
        pub first_name: String,
        pub last_name: String,
        pub active_status: bool,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Account {
        pub account_id: i64,
        pub account_name_owner: String,
        pub account_type: AccountType,
        pub active_status: bool,
        pub moniker: String,
        pub outstanding: Amount,
        pub future: Amount,
        pub cleared: Amount,
        pub date_closed: Option<DateTime<Utc>>,
        /// Date of the latest cleared/outstanding validation amount.
        pub validation_date: Option<DateTime<Utc>>,
        pub date_added: DateTime<Utc>,
        pub date_updated: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountInput {
        pub account_name_owner: String,
        pub account_type: AccountType,
        pub active_status: Option<bool>,
        pub moniker: Option<String>,
        pub date_closed: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Totals {
        pub totals: Amount,
        pub totals_cleared: Amount,
        pub totals_outstanding: Amount,
        pub totals_future: Amount,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Category {
        pub category_id: i64,
        pub category_name: String,
        pub active_status: bool,
        pub category_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryInput {
        pub category_name: String,
        pub active_status: Option<bool>,
    }
}

pub mod description {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Description {
        pub description_id: i64,
        pub description_name: String,
        pub active_status: bool,
        pub description_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DescriptionInput {
        pub description_name: String,
        pub active_status: Option<bool>,
    }
}

pub mod parameter {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Parameter {
        pub parameter_id: i64,
        pub parameter_name: String,
        pub parameter_value: String,
        pub active_status: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ParameterInput {
        pub parameter_name: String,
        pub parameter_value: String,
        pub active_status: Option<bool>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Transaction {
        pub transaction_id: i64,
        pub guid: Uuid,
        pub account_id: i64,
        pub account_type: AccountType,
        pub transaction_type: TransactionType,
        pub account_name_owner: String,
        pub transaction_date: NaiveDate,
        pub description: String,
        pub category: String,
        pub amount: Amount,
        pub transaction_state: TransactionState,
        pub reoccurring_type: ReoccurringType,
        pub active_status: bool,
        pub notes: String,
        pub receipt_image_id: Option<i64>,
        pub date_added: DateTime<Utc>,
        pub date_updated: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionInput {
        /// Generated by the server when absent.
        pub guid: Option<Uuid>,
        pub account_type: AccountType,
        #[serde(default)]
        pub transaction_type: TransactionType,
        pub account_name_owner: String,
        pub transaction_date: NaiveDate,
        pub description: String,
        pub category: Option<String>,
        pub amount: Amount,
        pub transaction_state: TransactionState,
        #[serde(default)]
        pub reoccurring_type: ReoccurringType,
        pub active_status: Option<bool>,
        pub notes: Option<String>,
    }

    /// Moves a transaction to another account.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionAccountChange {
        pub guid: Uuid,
        pub account_name_owner: String,
    }
}

pub mod payment {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payment {
        pub payment_id: i64,
        pub source_account: String,
        pub destination_account: String,
        pub transaction_date: NaiveDate,
        pub amount: Amount,
        pub guid_source: Uuid,
        pub guid_destination: Uuid,
        pub active_status: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentInput {
        /// Falls back to the `payment_account` parameter when absent.
        pub source_account: Option<String>,
        pub destination_account: String,
        pub transaction_date: NaiveDate,
        pub amount: Amount,
        pub active_status: Option<bool>,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Transfer {
        pub transfer_id: i64,
        pub source_account: String,
        pub destination_account: String,
        pub transaction_date: NaiveDate,
        pub amount: Amount,
        pub guid_source: Uuid,
        pub guid_destination: Uuid,
        pub active_status: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferInput {
        pub source_account: String,
        pub destination_account: String,
        pub transaction_date: NaiveDate,
        pub amount: Amount,
        pub active_status: Option<bool>,
    }
}

pub mod pending {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PendingTransaction {
        pub pending_transaction_id: i64,
        pub account_name_owner: String,
        pub transaction_date: NaiveDate,
        pub description: String,
        pub amount: Amount,
        pub review_status: String,
        pub date_added: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PendingTransactionInput {
        pub account_name_owner: String,
        pub transaction_date: NaiveDate,
        pub description: String,
        pub amount: Amount,
        pub review_status: Option<String>,
    }
}

pub mod receipt {
    use super::*;

    /// A receipt image. `image` and `thumbnail` are base64 (standard alphabet).
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReceiptImage {
        pub receipt_image_id: i64,
        pub transaction_id: i64,
        pub image: String,
        pub thumbnail: String,
        pub image_format_type: ImageFormatType,
        pub active_status: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReceiptImageInput {
        pub transaction_id: i64,
        pub image: String,
        pub thumbnail: Option<String>,
        pub active_status: Option<bool>,
    }
}

pub mod validation {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ValidationAmount {
        pub validation_id: i64,
        pub account_id: i64,
        pub validation_date: DateTime<Utc>,
        pub transaction_state: TransactionState,
        pub amount: Amount,
        pub active_status: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ValidationAmountInput {
        /// Required unless the route names the account.
        pub account_id: Option<i64>,
        pub validation_date: DateTime<Utc>,
        pub transaction_state: TransactionState,
        pub amount: Amount,
        pub active_status: Option<bool>,
    }
}

pub mod family {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FamilyMember {
        pub family_member_id: i64,
        pub owner: String,
        pub member_name: String,
        pub relationship: FamilyRelationship,
        pub date_of_birth: Option<NaiveDate>,
        pub insurance_member_id: Option<String>,
        pub ssn_last_four: Option<String>,
        pub medical_record_number: Option<String>,
        pub active_status: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FamilyMemberInput {
        pub member_name: String,
        pub relationship: FamilyRelationship,
        pub date_of_birth: Option<NaiveDate>,
        pub insurance_member_id: Option<String>,
        pub ssn_last_four: Option<String>,
        pub medical_record_number: Option<String>,
        pub active_status: Option<bool>,
    }
}

pub mod medical {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MedicalExpense {
        pub medical_expense_id: i64,
        pub transaction_id: Option<i64>,
        pub provider_id: Option<i64>,
        pub family_member_id: Option<i64>,
        pub service_date: NaiveDate,
        pub service_description: Option<String>,
        pub procedure_code: Option<String>,
        pub diagnosis_code: Option<String>,
        pub billed_amount: Amount,
        pub insurance_discount: Amount,
        pub insurance_paid: Amount,
        pub patient_responsibility: Amount,
        pub paid_amount: Amount,
        pub paid_date: Option<NaiveDate>,
        pub is_out_of_network: bool,
        pub claim_number: Option<String>,
        pub claim_status: ClaimStatus,
        pub active_status: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MedicalExpenseInput {
        pub transaction_id: Option<i64>,
        pub provider_id: Option<i64>,
        pub family_member_id: Option<i64>,
        pub service_date: NaiveDate,
        pub service_description: Option<String>,
        pub procedure_code: Option<String>,
        pub diagnosis_code: Option<String>,
        pub billed_amount: Amount,
        #[serde(default)]
        pub insurance_discount: Amount,
        #[serde(default)]
        pub insurance_paid: Amount,
        #[serde(default)]
        pub patient_responsibility: Amount,
        #[serde(default)]
        pub paid_amount: Amount,
        pub paid_date: Option<NaiveDate>,
        #[serde(default)]
        pub is_out_of_network: bool,
        pub claim_number: Option<String>,
        pub claim_status: ClaimStatus,
        pub active_status: Option<bool>,
    }

    #[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MedicalTotals {
        pub year: i32,
        pub count: u64,
        pub total_billed: Amount,
        pub total_insurance_paid: Amount,
        pub total_patient_responsibility: Amount,
        pub total_paid: Amount,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClaimStatusCount {
        pub claim_status: ClaimStatus,
        pub count: u64,
    }
}
