//! Pending transactions: imported entries waiting for review.

use api_types::pending::{PendingTransaction, PendingTransactionInput};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth::CurrentUser, non_empty, server::ServerState};

pub async fn active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PendingTransaction>>, ServerError> {
    Ok(Json(state.engine.pending_transactions(&user.username).await?))
}

pub async fn all(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<PendingTransaction>>, ServerError> {
    non_empty(
        state.engine.pending_transactions(&user.username).await?,
        "pending transactions",
    )
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<PendingTransaction>, ServerError> {
    Ok(Json(
        state.engine.pending_transaction(id, &user.username).await?,
    ))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<PendingTransactionInput>,
) -> Result<(StatusCode, Json<PendingTransaction>), ServerError> {
    let pending = state
        .engine
        .insert_pending_transaction(payload, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(pending)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PendingTransactionInput>,
) -> Result<Json<PendingTransaction>, ServerError> {
    let pending = state
        .engine
        .update_pending_transaction(id, payload, &user.username)
        .await?;
    Ok(Json(pending))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<PendingTransaction>, ServerError> {
    let pending = state
        .engine
        .delete_pending_transaction(id, &user.username)
        .await?;
    Ok(Json(pending))
}

pub async fn delete_all(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    let removed = state
        .engine
        .delete_all_pending_transactions(&user.username)
        .await?;
    tracing::info!(username = %user.username, removed, "pending transactions cleared");
    Ok(StatusCode::NO_CONTENT)
}
