//! Validation amounts: balance checkpoints recorded against an account.

use api_types::{
    TransactionState,
    validation::{ValidationAmount, ValidationAmountInput},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth::CurrentUser, server::ServerState};

pub async fn active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ValidationAmount>>, ServerError> {
    Ok(Json(
        state.engine.validation_amounts_active(&user.username).await?,
    ))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ValidationAmount>, ServerError> {
    Ok(Json(state.engine.validation_amount(id, &user.username).await?))
}

/// Latest active validation amount of an account in the given state.
pub async fn latest(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path((name, transaction_state)): Path<(String, String)>,
) -> Result<Json<ValidationAmount>, ServerError> {
    let transaction_state: TransactionState = transaction_state.parse()?;
    let validation = state
        .engine
        .latest_validation_amount(&name, transaction_state, &user.username)
        .await?;
    Ok(Json(validation))
}

/// The account comes from `accountId` in the body.
pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ValidationAmountInput>,
) -> Result<(StatusCode, Json<ValidationAmount>), ServerError> {
    let validation = state
        .engine
        .insert_validation_amount(None, payload, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(validation)))
}

pub async fn insert_for_account(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
    Json(payload): Json<ValidationAmountInput>,
) -> Result<(StatusCode, Json<ValidationAmount>), ServerError> {
    let validation = state
        .engine
        .insert_validation_amount(Some(&name), payload, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(validation)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ValidationAmountInput>,
) -> Result<Json<ValidationAmount>, ServerError> {
    let validation = state
        .engine
        .update_validation_amount(id, payload, &user.username)
        .await?;
    Ok(Json(validation))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ValidationAmount>, ServerError> {
    let validation = state
        .engine
        .delete_validation_amount(id, &user.username)
        .await?;
    Ok(Json(validation))
}
