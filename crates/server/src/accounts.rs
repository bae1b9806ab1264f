//! Accounts API endpoints.

use api_types::{
    RenameQuery,
    account::{Account, AccountInput, Totals},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, auth::CurrentUser, non_empty, server::ServerState};

pub async fn active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Account>>, ServerError> {
    Ok(Json(state.engine.accounts_active(&user.username).await?))
}

pub async fn select_active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Account>>, ServerError> {
    non_empty(state.engine.accounts_active(&user.username).await?, "accounts")
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Account>, ServerError> {
    Ok(Json(state.engine.account(&name, &user.username).await?))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountInput>,
) -> Result<(StatusCode, Json<Account>), ServerError> {
    let account = state.engine.insert_account(payload, &user.username).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
    Json(payload): Json<AccountInput>,
) -> Result<Json<Account>, ServerError> {
    let account = state
        .engine
        .update_account(&name, payload, &user.username)
        .await?;
    Ok(Json(account))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Account>, ServerError> {
    Ok(Json(state.engine.delete_account(&name, &user.username).await?))
}

/// `PUT /api/account/rename?old=…&new=…`
pub async fn rename(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<RenameQuery>,
) -> Result<Json<Account>, ServerError> {
    let account = state
        .engine
        .rename_account(&query.old, &query.new, &user.username)
        .await?;
    Ok(Json(account))
}

pub async fn activate(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Account>, ServerError> {
    let account = state
        .engine
        .set_account_active(&name, true, &user.username)
        .await?;
    Ok(Json(account))
}

pub async fn deactivate(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Account>, ServerError> {
    let account = state
        .engine
        .set_account_active(&name, false, &user.username)
        .await?;
    Ok(Json(account))
}

pub async fn totals(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Totals>, ServerError> {
    Ok(Json(state.engine.account_totals(&user.username).await?))
}

pub async fn payment_required(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Account>>, ServerError> {
    Ok(Json(
        state.engine.accounts_payment_required(&user.username).await?,
    ))
}
