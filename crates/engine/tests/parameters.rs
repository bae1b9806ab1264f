mod common;

use api_types::parameter::ParameterInput;
use engine::EngineError;

use common::{ALICE, BOB, engine_with_db};

fn parameter_input(name: &str, value: &str) -> ParameterInput {
    ParameterInput {
        parameter_name: name.to_string(),
        parameter_value: value.to_string(),
        active_status: None,
    }
}

#[tokio::test]
async fn insert_and_fetch_parameter() {
    let (engine, _db) = engine_with_db().await;

    let parameter = engine
        .insert_parameter(parameter_input("Payment_Account", " checking_brian "), ALICE)
        .await
        .unwrap();
    assert_eq!(parameter.parameter_name, "payment_account");
    assert_eq!(parameter.parameter_value, "checking_brian");
    assert!(parameter.active_status);

    let fetched = engine.parameter("Payment_Account", ALICE).await.unwrap();
    assert_eq!(fetched.parameter_id, parameter.parameter_id);
    assert_eq!(fetched.parameter_value, "checking_brian");

    let active = engine.parameters_active(ALICE).await.unwrap();
    assert_eq!(active.len(), 1);
    assert!(engine.parameters_active(BOB).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicates_and_empty_values_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_parameter(parameter_input("payment_account", "checking_brian"), ALICE)
        .await
        .unwrap();

    assert!(matches!(
        engine
            .insert_parameter(parameter_input("PAYMENT_ACCOUNT", "savings_brian"), ALICE)
            .await,
        Err(EngineError::ExistingKey(_))
    ));
    assert!(matches!(
        engine
            .insert_parameter(parameter_input("timezone", "   "), ALICE)
            .await,
        Err(EngineError::InvalidValue(_))
    ));

    // The same name is free for another owner.
    engine
        .insert_parameter(parameter_input("payment_account", "checking_kari"), BOB)
        .await
        .unwrap();
}

#[tokio::test]
async fn update_renames_and_guards_collisions() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_parameter(parameter_input("payment_account", "checking_brian"), ALICE)
        .await
        .unwrap();
    engine
        .insert_parameter(parameter_input("timezone", "utc"), ALICE)
        .await
        .unwrap();

    let updated = engine
        .update_parameter(
            "payment_account",
            parameter_input("payment_account", "savings_brian"),
            ALICE,
        )
        .await
        .unwrap();
    assert_eq!(updated.parameter_value, "savings_brian");

    assert!(matches!(
        engine
            .update_parameter("timezone", parameter_input("payment_account", "x"), ALICE)
            .await,
        Err(EngineError::ExistingKey(_))
    ));
    assert!(matches!(
        engine
            .update_parameter("missing", parameter_input("missing", "x"), ALICE)
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .update_parameter("timezone", parameter_input("timezone", "cet"), BOB)
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn delete_removes_parameter() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_parameter(parameter_input("timezone", "utc"), ALICE)
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_parameter("timezone", BOB).await,
        Err(EngineError::KeyNotFound(_))
    ));
    let deleted = engine.delete_parameter("timezone", ALICE).await.unwrap();
    assert_eq!(deleted.parameter_value, "utc");
    assert!(matches!(
        engine.parameter("timezone", ALICE).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.parameters_active(ALICE).await.unwrap().is_empty());
}
