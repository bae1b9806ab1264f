mod common;

use api_types::{
    AccountType, Amount, TransactionState, account::Totals, validation::ValidationAmountInput,
};
use chrono::{TimeZone, Utc};
use engine::EngineError;

use common::{ALICE, BOB, account_input, engine_with_db, transaction_input};

#[tokio::test]
async fn insert_and_fetch_account() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .insert_account(account_input("Chase_Brian", AccountType::Credit), ALICE)
        .await
        .unwrap();
    assert_eq!(account.account_name_owner, "chase_brian");
    assert_eq!(account.moniker, "0000");
    assert!(account.active_status);
    assert_eq!(account.validation_date, None);

    let fetched = engine.account("chase_brian", ALICE).await.unwrap();
    assert_eq!(fetched.account_id, account.account_id);
}

#[tokio::test]
async fn duplicate_and_malformed_names_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_account(account_input("chase_brian", AccountType::Credit), ALICE)
        .await
        .unwrap();

    let duplicate = engine
        .insert_account(account_input("chase_brian", AccountType::Debit), ALICE)
        .await;
    assert!(matches!(duplicate, Err(EngineError::ExistingKey(_))));

    let malformed = engine
        .insert_account(account_input("chase brian", AccountType::Debit), ALICE)
        .await;
    assert!(matches!(malformed, Err(EngineError::InvalidValue(_))));
}

#[tokio::test]
async fn accounts_are_scoped_to_their_owner() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_account(account_input("chase_brian", AccountType::Credit), ALICE)
        .await
        .unwrap();

    assert!(engine.accounts_active(BOB).await.unwrap().is_empty());
    assert!(matches!(
        engine.account("chase_brian", BOB).await,
        Err(EngineError::KeyNotFound(_))
    ));

    // Same name for another user is fine.
    engine
        .insert_account(account_input("chase_brian", AccountType::Credit), BOB)
        .await
        .unwrap();
}

#[tokio::test]
async fn balances_follow_transactions() {
    let (engine, _db) = engine_with_db().await;

    engine
        .insert_transaction(
            transaction_input("visa_brian", AccountType::Credit, 1_000, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();
    let outstanding = engine
        .insert_transaction(
            transaction_input("visa_brian", AccountType::Credit, 250, TransactionState::Outstanding),
            ALICE,
        )
        .await
        .unwrap();
    engine
        .insert_transaction(
            transaction_input("visa_brian", AccountType::Credit, 75, TransactionState::Future),
            ALICE,
        )
        .await
        .unwrap();

    let account = engine.account("visa_brian", ALICE).await.unwrap();
    assert_eq!(account.account_type, AccountType::Credit);
    assert_eq!(account.cleared, Amount::new(1_000));
    assert_eq!(account.outstanding, Amount::new(250));
    assert_eq!(account.future, Amount::new(75));

    engine
        .update_transaction_state(outstanding.guid, TransactionState::Cleared, ALICE)
        .await
        .unwrap();
    let account = engine.account("visa_brian", ALICE).await.unwrap();
    assert_eq!(account.cleared, Amount::new(1_250));
    assert_eq!(account.outstanding, Amount::ZERO);

    assert_eq!(
        engine.account_totals(ALICE).await.unwrap(),
        Totals {
            totals: Amount::new(1_325),
            totals_cleared: Amount::new(1_250),
            totals_outstanding: Amount::ZERO,
            totals_future: Amount::new(75),
        }
    );
}

#[tokio::test]
async fn payment_required_lists_credit_accounts_with_balance() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_transaction(
            transaction_input("visa_brian", AccountType::Credit, 500, TransactionState::Outstanding),
            ALICE,
        )
        .await
        .unwrap();
    engine
        .insert_transaction(
            transaction_input("amex_brian", AccountType::Credit, 500, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();
    engine
        .insert_transaction(
            transaction_input("checking_brian", AccountType::Debit, 500, TransactionState::Outstanding),
            ALICE,
        )
        .await
        .unwrap();

    let required = engine.accounts_payment_required(ALICE).await.unwrap();
    let names: Vec<_> = required.iter().map(|a| a.account_name_owner.as_str()).collect();
    assert_eq!(names, vec!["visa_brian"]);
}

#[tokio::test]
async fn rename_moves_transactions() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine
        .insert_transaction(
            transaction_input("visa_brian", AccountType::Credit, 500, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();

    let renamed = engine
        .rename_account("visa_brian", "visa_kari", ALICE)
        .await
        .unwrap();
    assert_eq!(renamed.account_name_owner, "visa_kari");

    let tx = engine.transaction(tx.guid, ALICE).await.unwrap();
    assert_eq!(tx.account_name_owner, "visa_kari");
    assert!(matches!(
        engine.account("visa_brian", ALICE).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn delete_refuses_accounts_with_transactions() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_transaction(
            transaction_input("visa_brian", AccountType::Credit, 500, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();
    engine
        .insert_account(account_input("empty_brian", AccountType::Debit), ALICE)
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_account("visa_brian", ALICE).await,
        Err(EngineError::ExistingKey(_))
    ));
    let deleted = engine.delete_account("empty_brian", ALICE).await.unwrap();
    assert_eq!(deleted.account_name_owner, "empty_brian");
    assert!(matches!(
        engine.delete_account("empty_brian", ALICE).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn deactivated_accounts_leave_the_active_list() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_account(account_input("visa_brian", AccountType::Credit), ALICE)
        .await
        .unwrap();

    let account = engine
        .set_account_active("visa_brian", false, ALICE)
        .await
        .unwrap();
    assert!(!account.active_status);
    assert!(engine.accounts_active(ALICE).await.unwrap().is_empty());

    engine
        .set_account_active("visa_brian", true, ALICE)
        .await
        .unwrap();
    assert_eq!(engine.accounts_active(ALICE).await.unwrap().len(), 1);
}

fn validation_input(day: u32, state: TransactionState) -> ValidationAmountInput {
    ValidationAmountInput {
        account_id: None,
        validation_date: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        transaction_state: state,
        amount: Amount::new(10_000),
        active_status: None,
    }
}

#[tokio::test]
async fn validation_date_tracks_latest_checkpoint() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_account(account_input("checking_brian", AccountType::Debit), ALICE)
        .await
        .unwrap();

    let early = engine
        .insert_validation_amount(
            Some("checking_brian"),
            validation_input(1, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();
    let late = engine
        .insert_validation_amount(
            Some("checking_brian"),
            validation_input(20, TransactionState::Outstanding),
            ALICE,
        )
        .await
        .unwrap();

    let account = engine.account("checking_brian", ALICE).await.unwrap();
    assert_eq!(account.validation_date, Some(late.validation_date));

    engine
        .delete_validation_amount(late.validation_id, ALICE)
        .await
        .unwrap();
    let account = engine.account("checking_brian", ALICE).await.unwrap();
    assert_eq!(account.validation_date, Some(early.validation_date));

    engine
        .delete_validation_amount(early.validation_id, ALICE)
        .await
        .unwrap();
    let account = engine.account("checking_brian", ALICE).await.unwrap();
    assert_eq!(account.validation_date, None);
}

#[tokio::test]
async fn deactivated_validation_amounts_stop_counting() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_account(account_input("checking_brian", AccountType::Debit), ALICE)
        .await
        .unwrap();
    let early = engine
        .insert_validation_amount(
            Some("checking_brian"),
            validation_input(1, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();
    let late = engine
        .insert_validation_amount(
            Some("checking_brian"),
            validation_input(20, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();

    let mut input = validation_input(20, TransactionState::Cleared);
    input.active_status = Some(false);
    engine
        .update_validation_amount(late.validation_id, input, ALICE)
        .await
        .unwrap();

    let account = engine.account("checking_brian", ALICE).await.unwrap();
    assert_eq!(account.validation_date, Some(early.validation_date));

    let latest = engine
        .latest_validation_amount("checking_brian", TransactionState::Cleared, ALICE)
        .await
        .unwrap();
    assert_eq!(latest.validation_id, early.validation_id);
}

#[tokio::test]
async fn future_state_is_not_a_checkpoint() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_account(account_input("checking_brian", AccountType::Debit), ALICE)
        .await
        .unwrap();

    let result = engine
        .insert_validation_amount(
            Some("checking_brian"),
            validation_input(1, TransactionState::Future),
            ALICE,
        )
        .await;
    assert!(matches!(result, Err(EngineError::InvalidValue(_))));
}

#[tokio::test]
async fn overflowing_balance_is_rejected_and_rolled_back() {
    let (engine, _db) = engine_with_db().await;
    let half = i64::MAX / 2 + 1;

    engine
        .insert_transaction(
            transaction_input("savings_brian", AccountType::Debit, half, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();
    assert!(matches!(
        engine
            .insert_transaction(
                transaction_input("savings_brian", AccountType::Debit, half, TransactionState::Cleared),
                ALICE,
            )
            .await,
        Err(EngineError::InvalidValue(_))
    ));

    let account = engine.account("savings_brian", ALICE).await.unwrap();
    assert_eq!(account.cleared, Amount::new(half));
    assert_eq!(
        engine
            .transactions_by_account("savings_brian", ALICE)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn totals_that_overflow_are_reported() {
    let (engine, _db) = engine_with_db().await;
    let half = i64::MAX / 2 + 1;

    engine
        .insert_transaction(
            transaction_input("savings_brian", AccountType::Debit, half, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();
    engine
        .insert_transaction(
            transaction_input("savings_brian", AccountType::Debit, half, TransactionState::Outstanding),
            ALICE,
        )
        .await
        .unwrap();
    assert!(matches!(
        engine.account_transaction_totals("savings_brian", ALICE).await,
        Err(EngineError::InvalidValue(_))
    ));

    engine
        .insert_transaction(
            transaction_input("checking_brian", AccountType::Debit, half, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap();
    assert!(matches!(
        engine.account_totals(ALICE).await,
        Err(EngineError::InvalidValue(_))
    ));
}
