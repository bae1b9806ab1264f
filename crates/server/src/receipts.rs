use api_types::receipt::{ReceiptImage, ReceiptImageInput};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth::CurrentUser, server::ServerState};

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ReceiptImage>, ServerError> {
    Ok(Json(state.engine.receipt_image(id, &user.username).await?))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ReceiptImageInput>,
) -> Result<(StatusCode, Json<ReceiptImage>), ServerError> {
    let receipt = state
        .engine
        .insert_receipt_image(payload, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
