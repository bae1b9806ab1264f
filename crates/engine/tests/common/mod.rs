#![allow(dead_code)]

use api_types::{
    AccountType, Amount, ReoccurringType, TransactionState, TransactionType,
    account::AccountInput, transaction::TransactionInput,
};
use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::Engine;
use migration::MigratorTrait;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .bcrypt_cost(4)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn account_input(name: &str, account_type: AccountType) -> AccountInput {
    AccountInput {
        account_name_owner: name.to_string(),
        account_type,
        active_status: None,
        moniker: None,
        date_closed: None,
    }
}

pub fn transaction_input(
    account: &str,
    account_type: AccountType,
    amount: i64,
    state: TransactionState,
) -> TransactionInput {
    TransactionInput {
        guid: None,
        account_type,
        transaction_type: TransactionType::Expense,
        account_name_owner: account.to_string(),
        transaction_date: date(2024, 1, 15),
        description: "Grocery Store".to_string(),
        category: Some("groceries".to_string()),
        amount: Amount::new(amount),
        transaction_state: state,
        reoccurring_type: ReoccurringType::Onetime,
        active_status: None,
        notes: None,
    }
}
