//! Transactions API endpoints

use api_types::{
    TransactionState,
    account::Totals,
    receipt::ReceiptImage,
    transaction::{Transaction, TransactionAccountChange, TransactionInput},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, auth::CurrentUser, non_empty, server::ServerState};

pub async fn active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    Ok(Json(state.engine.transactions_active(&user.username).await?))
}

pub async fn select_active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    non_empty(
        state.engine.transactions_active(&user.username).await?,
        "transactions",
    )
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(guid): Path<Uuid>,
) -> Result<Json<Transaction>, ServerError> {
    Ok(Json(state.engine.transaction(guid, &user.username).await?))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionInput>,
) -> Result<(StatusCode, Json<Transaction>), ServerError> {
    let transaction = state
        .engine
        .insert_transaction(payload, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(guid): Path<Uuid>,
    Json(payload): Json<TransactionInput>,
) -> Result<Json<Transaction>, ServerError> {
    let transaction = state
        .engine
        .update_transaction(guid, payload, &user.username)
        .await?;
    Ok(Json(transaction))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(guid): Path<Uuid>,
) -> Result<Json<Transaction>, ServerError> {
    Ok(Json(
        state.engine.delete_transaction(guid, &user.username).await?,
    ))
}

/// Active transactions of one account; 404 when the account is unknown.
pub async fn by_account(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let transactions = state
        .engine
        .transactions_by_account(&name, &user.username)
        .await?;
    Ok(Json(transactions))
}

pub async fn account_totals(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Totals>, ServerError> {
    let totals = state
        .engine
        .account_transaction_totals(&name, &user.username)
        .await?;
    Ok(Json(totals))
}

pub async fn by_category(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let transactions = state
        .engine
        .transactions_by_category(&name, &user.username)
        .await?;
    Ok(Json(transactions))
}

pub async fn by_description(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let transactions = state
        .engine
        .transactions_by_description(&name, &user.username)
        .await?;
    Ok(Json(transactions))
}

pub async fn update_state(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path((guid, transaction_state)): Path<(Uuid, String)>,
) -> Result<Json<Transaction>, ServerError> {
    let transaction_state: TransactionState = transaction_state.parse()?;
    let transaction = state
        .engine
        .update_transaction_state(guid, transaction_state, &user.username)
        .await?;
    Ok(Json(transaction))
}

/// Schedule the next occurrence of a reoccurring transaction.
pub async fn insert_future(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionInput>,
) -> Result<(StatusCode, Json<Transaction>), ServerError> {
    let transaction = state
        .engine
        .insert_future_transaction(payload, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn change_account(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionAccountChange>,
) -> Result<Json<Transaction>, ServerError> {
    let transaction = state
        .engine
        .change_transaction_account(payload, &user.username)
        .await?;
    Ok(Json(transaction))
}

/// The body is the base64 image itself, optionally as a data URL.
pub async fn update_receipt_image(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(guid): Path<Uuid>,
    body: String,
) -> Result<Json<ReceiptImage>, ServerError> {
    let image = body.trim().trim_matches('"');
    let receipt = state
        .engine
        .update_transaction_receipt_image(guid, image, &user.username)
        .await?;
    Ok(Json(receipt))
}
