use api_types::transfer::{Transfer, TransferInput};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth::CurrentUser, non_empty, server::ServerState};

pub async fn active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Transfer>>, ServerError> {
    Ok(Json(state.engine.transfers_active(&user.username).await?))
}

pub async fn select(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Transfer>>, ServerError> {
    non_empty(
        state.engine.transfers_active(&user.username).await?,
        "transfers",
    )
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Transfer>, ServerError> {
    Ok(Json(state.engine.transfer(id, &user.username).await?))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferInput>,
) -> Result<(StatusCode, Json<Transfer>), ServerError> {
    let transfer = state.engine.insert_transfer(payload, &user.username).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TransferInput>,
) -> Result<Json<Transfer>, ServerError> {
    let transfer = state
        .engine
        .update_transfer(id, payload, &user.username)
        .await?;
    Ok(Json(transfer))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Transfer>, ServerError> {
    Ok(Json(state.engine.delete_transfer(id, &user.username).await?))
}
