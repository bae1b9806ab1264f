//! Payments API endpoints.
//!
//! A payment books two transactions; see the engine for the amount rules.

use api_types::payment::{Payment, PaymentInput};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth::CurrentUser, non_empty, server::ServerState};

pub async fn active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Payment>>, ServerError> {
    Ok(Json(state.engine.payments_active(&user.username).await?))
}

pub async fn select(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Payment>>, ServerError> {
    non_empty(state.engine.payments_active(&user.username).await?, "payments")
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Payment>, ServerError> {
    Ok(Json(state.engine.payment(id, &user.username).await?))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<PaymentInput>,
) -> Result<(StatusCode, Json<Payment>), ServerError> {
    let payment = state.engine.insert_payment(payload, &user.username).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentInput>,
) -> Result<Json<Payment>, ServerError> {
    let payment = state
        .engine
        .update_payment(id, payload, &user.username)
        .await?;
    Ok(Json(payment))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Payment>, ServerError> {
    Ok(Json(state.engine.delete_payment(id, &user.username).await?))
}
