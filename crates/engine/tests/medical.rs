mod common;

use api_types::{
    AccountType, Amount, ClaimStatus, DateRangeQuery, FamilyRelationship, TransactionState,
    family::FamilyMemberInput, medical::MedicalExpenseInput,
};
use engine::{Engine, EngineError};

use common::{ALICE, BOB, date, engine_with_db, transaction_input};

fn member_input(name: &str, relationship: FamilyRelationship) -> FamilyMemberInput {
    FamilyMemberInput {
        member_name: name.to_string(),
        relationship,
        date_of_birth: Some(date(2015, 5, 5)),
        insurance_member_id: None,
        ssn_last_four: Some("1234".to_string()),
        medical_record_number: None,
        active_status: None,
    }
}

fn expense_input(service_date: chrono::NaiveDate, status: ClaimStatus) -> MedicalExpenseInput {
    MedicalExpenseInput {
        transaction_id: None,
        provider_id: Some(7),
        family_member_id: None,
        service_date,
        service_description: Some("annual checkup".to_string()),
        procedure_code: Some("99213".to_string()),
        diagnosis_code: Some("z00.00".to_string()),
        billed_amount: Amount::new(20_000),
        insurance_discount: Amount::new(5_000),
        insurance_paid: Amount::new(10_000),
        patient_responsibility: Amount::new(5_000),
        paid_amount: Amount::new(1_000),
        paid_date: None,
        is_out_of_network: false,
        claim_number: None,
        claim_status: status,
        active_status: None,
    }
}

async fn seed_transaction(engine: &Engine) -> i64 {
    engine
        .insert_transaction(
            transaction_input("hsa_brian", AccountType::Debit, 5_000, TransactionState::Cleared),
            ALICE,
        )
        .await
        .unwrap()
        .transaction_id
}

#[tokio::test]
async fn family_members_are_private_to_their_owner() {
    let (engine, _db) = engine_with_db().await;
    let member = engine
        .insert_family_member(member_input("Kid One", FamilyRelationship::Child), ALICE)
        .await
        .unwrap();
    assert_eq!(member.owner, ALICE);

    assert!(matches!(
        engine.family_members_by_owner(ALICE, BOB).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.family_member(member.family_member_id, BOB).await,
        Err(EngineError::KeyNotFound(_))
    ));

    let children = engine
        .family_members_by_relationship(ALICE, FamilyRelationship::Child, ALICE)
        .await
        .unwrap();
    assert_eq!(children.len(), 1);
    assert!(engine
        .family_members_by_relationship(ALICE, FamilyRelationship::Spouse, ALICE)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn family_member_validation() {
    let (engine, _db) = engine_with_db().await;
    let mut input = member_input("Kid One", FamilyRelationship::Child);
    input.ssn_last_four = Some("12a4".to_string());
    assert!(matches!(
        engine.insert_family_member(input, ALICE).await,
        Err(EngineError::InvalidValue(_))
    ));

    engine
        .insert_family_member(member_input("Kid One", FamilyRelationship::Child), ALICE)
        .await
        .unwrap();
    assert!(matches!(
        engine
            .insert_family_member(member_input("Kid One", FamilyRelationship::Child), ALICE)
            .await,
        Err(EngineError::ExistingKey(_))
    ));
}

#[tokio::test]
async fn expense_amounts_must_add_up() {
    let (engine, _db) = engine_with_db().await;

    let mut over = expense_input(date(2024, 2, 1), ClaimStatus::Submitted);
    over.patient_responsibility = Amount::new(5_001);
    assert!(matches!(
        engine.insert_medical_expense(over, ALICE).await,
        Err(EngineError::InvalidValue(_))
    ));

    let mut overpaid = expense_input(date(2024, 2, 1), ClaimStatus::Submitted);
    overpaid.paid_amount = Amount::new(5_001);
    assert!(matches!(
        engine.insert_medical_expense(overpaid, ALICE).await,
        Err(EngineError::InvalidValue(_))
    ));

    let half = i64::MAX / 2 + 1;
    let mut wrapping = expense_input(date(2024, 2, 1), ClaimStatus::Submitted);
    wrapping.billed_amount = Amount::new(100);
    wrapping.insurance_discount = Amount::new(half);
    wrapping.insurance_paid = Amount::new(half);
    wrapping.patient_responsibility = Amount::ZERO;
    wrapping.paid_amount = Amount::ZERO;
    assert!(matches!(
        engine.insert_medical_expense(wrapping, ALICE).await,
        Err(EngineError::InvalidValue(_))
    ));

    let expense = engine
        .insert_medical_expense(expense_input(date(2024, 2, 1), ClaimStatus::Submitted), ALICE)
        .await
        .unwrap();
    assert_eq!(expense.diagnosis_code.as_deref(), Some("Z00.00"));
}

#[tokio::test]
async fn one_expense_per_transaction() {
    let (engine, _db) = engine_with_db().await;
    let transaction_id = seed_transaction(&engine).await;

    let mut input = expense_input(date(2024, 2, 1), ClaimStatus::Paid);
    input.transaction_id = Some(transaction_id);
    let expense = engine.insert_medical_expense(input, ALICE).await.unwrap();

    let mut again = expense_input(date(2024, 2, 2), ClaimStatus::Paid);
    again.transaction_id = Some(transaction_id);
    assert!(matches!(
        engine.insert_medical_expense(again, ALICE).await,
        Err(EngineError::ExistingKey(_))
    ));

    // Re-saving the same expense keeps its link.
    let mut same = expense_input(date(2024, 2, 1), ClaimStatus::Closed);
    same.transaction_id = Some(transaction_id);
    engine
        .update_medical_expense(expense.medical_expense_id, same, ALICE)
        .await
        .unwrap();

    let found = engine
        .medical_expense_by_transaction(transaction_id, ALICE)
        .await
        .unwrap();
    assert_eq!(found.medical_expense_id, expense.medical_expense_id);
    assert_eq!(found.claim_status, ClaimStatus::Closed);
}

#[tokio::test]
async fn links_must_belong_to_the_caller() {
    let (engine, _db) = engine_with_db().await;
    let transaction_id = seed_transaction(&engine).await;
    let member = engine
        .insert_family_member(member_input("Kid One", FamilyRelationship::Child), ALICE)
        .await
        .unwrap();

    let mut foreign_tx = expense_input(date(2024, 2, 1), ClaimStatus::Submitted);
    foreign_tx.transaction_id = Some(transaction_id);
    assert!(matches!(
        engine.insert_medical_expense(foreign_tx, BOB).await,
        Err(EngineError::KeyNotFound(_))
    ));

    let mut foreign_member = expense_input(date(2024, 2, 1), ClaimStatus::Submitted);
    foreign_member.family_member_id = Some(member.family_member_id);
    assert!(matches!(
        engine.insert_medical_expense(foreign_member, BOB).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn deleting_links_keeps_the_expense() {
    let (engine, _db) = engine_with_db().await;
    let transaction_id = seed_transaction(&engine).await;
    let member = engine
        .insert_family_member(member_input("Kid One", FamilyRelationship::Child), ALICE)
        .await
        .unwrap();

    let mut input = expense_input(date(2024, 2, 1), ClaimStatus::Submitted);
    input.transaction_id = Some(transaction_id);
    input.family_member_id = Some(member.family_member_id);
    let expense = engine.insert_medical_expense(input, ALICE).await.unwrap();

    engine
        .delete_family_member(member.family_member_id, ALICE)
        .await
        .unwrap();
    let tx = engine.transactions_active(ALICE).await.unwrap().remove(0);
    engine.delete_transaction(tx.guid, ALICE).await.unwrap();

    let expense = engine
        .medical_expense(expense.medical_expense_id, ALICE)
        .await
        .unwrap();
    assert_eq!(expense.family_member_id, None);
    assert_eq!(expense.transaction_id, None);
}

#[tokio::test]
async fn expense_queries() {
    let (engine, _db) = engine_with_db().await;
    let transaction_id = seed_transaction(&engine).await;
    let account = engine.account("hsa_brian", ALICE).await.unwrap();
    let member = engine
        .insert_family_member(member_input("Kid One", FamilyRelationship::Child), ALICE)
        .await
        .unwrap();

    let mut linked = expense_input(date(2024, 3, 10), ClaimStatus::Processing);
    linked.transaction_id = Some(transaction_id);
    linked.family_member_id = Some(member.family_member_id);
    engine.insert_medical_expense(linked, ALICE).await.unwrap();

    let mut settled = expense_input(date(2023, 11, 2), ClaimStatus::Paid);
    settled.paid_amount = Amount::new(5_000);
    settled.is_out_of_network = true;
    settled.procedure_code = Some("80053".to_string());
    engine.insert_medical_expense(settled, ALICE).await.unwrap();

    engine
        .insert_medical_expense(expense_input(date(2024, 7, 4), ClaimStatus::Denied), BOB)
        .await
        .unwrap();

    assert_eq!(engine.medical_expenses(ALICE).await.unwrap().len(), 2);
    assert_eq!(
        engine
            .medical_expenses_by_account(account.account_id, None, ALICE)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(engine
        .medical_expenses_by_account(
            account.account_id,
            Some(DateRangeQuery {
                start_date: date(2024, 4, 1),
                end_date: date(2024, 12, 31),
            }),
            ALICE,
        )
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        engine
            .medical_expenses_by_family_member(member.family_member_id, None, ALICE)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(engine.medical_expenses_by_provider(7, ALICE).await.unwrap().len(), 2);
    assert_eq!(
        engine
            .medical_expenses_by_claim_status(ClaimStatus::Paid, ALICE)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(engine.medical_expenses_out_of_network(ALICE).await.unwrap().len(), 1);

    let outstanding = engine.medical_expenses_outstanding(ALICE).await.unwrap();
    assert_eq!(outstanding.len(), 1);
    assert_eq!(outstanding[0].claim_status, ClaimStatus::Processing);

    let open = engine.medical_expenses_open_claims(ALICE).await.unwrap();
    assert_eq!(open.len(), 1);

    assert_eq!(
        engine
            .medical_expenses_by_procedure_code("80053", ALICE)
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        engine
            .medical_expenses_by_diagnosis_code("Z00.00", ALICE)
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        engine
            .medical_expenses_by_date_range(
                DateRangeQuery {
                    start_date: date(2023, 1, 1),
                    end_date: date(2023, 12, 31),
                },
                ALICE,
            )
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(matches!(
        engine
            .medical_expenses_by_date_range(
                DateRangeQuery {
                    start_date: date(2024, 1, 1),
                    end_date: date(2023, 1, 1),
                },
                ALICE,
            )
            .await,
        Err(EngineError::InvalidValue(_))
    ));
}

#[tokio::test]
async fn yearly_totals_and_status_counts() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_medical_expense(expense_input(date(2024, 1, 5), ClaimStatus::Submitted), ALICE)
        .await
        .unwrap();
    engine
        .insert_medical_expense(expense_input(date(2024, 12, 31), ClaimStatus::Submitted), ALICE)
        .await
        .unwrap();
    engine
        .insert_medical_expense(expense_input(date(2025, 1, 1), ClaimStatus::Paid), ALICE)
        .await
        .unwrap();

    let totals = engine.medical_totals_by_year(2024, ALICE).await.unwrap();
    assert_eq!(totals.year, 2024);
    assert_eq!(totals.count, 2);
    assert_eq!(totals.total_billed, Amount::new(40_000));
    assert_eq!(totals.total_insurance_paid, Amount::new(20_000));
    assert_eq!(totals.total_patient_responsibility, Amount::new(10_000));
    assert_eq!(totals.total_paid, Amount::new(2_000));

    let counts = engine.medical_claim_status_counts(ALICE).await.unwrap();
    assert_eq!(counts.len(), 6);
    let count_of = |status: ClaimStatus| {
        counts
            .iter()
            .find(|entry| entry.claim_status == status)
            .map(|entry| entry.count)
    };
    assert_eq!(count_of(ClaimStatus::Submitted), Some(2));
    assert_eq!(count_of(ClaimStatus::Paid), Some(1));
    assert_eq!(count_of(ClaimStatus::Denied), Some(0));
}

#[tokio::test]
async fn yearly_totals_report_overflow() {
    let (engine, _db) = engine_with_db().await;
    let half = i64::MAX / 2 + 1;

    for day in [1, 2] {
        let mut expense = expense_input(date(2024, 4, day), ClaimStatus::Paid);
        expense.billed_amount = Amount::new(half);
        expense.insurance_discount = Amount::ZERO;
        expense.insurance_paid = Amount::ZERO;
        expense.patient_responsibility = Amount::ZERO;
        expense.paid_amount = Amount::ZERO;
        engine.insert_medical_expense(expense, ALICE).await.unwrap();
    }

    assert!(matches!(
        engine.medical_totals_by_year(2024, ALICE).await,
        Err(EngineError::InvalidValue(_))
    ));
}
