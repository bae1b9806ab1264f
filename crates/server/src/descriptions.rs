//! Descriptions API endpoints.

use api_types::{
    RenameQuery,
    description::{Description, DescriptionInput},
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
) -> Result<Json<Vec<Description>>, ServerError> {
    Ok(Json(state.engine.descriptions_active(&user.username).await?))
}

pub async fn select_active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Description>>, ServerError> {
    non_empty(
        state.engine.descriptions_active(&user.username).await?,
        "descriptions",
    )
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Description>, ServerError> {
    Ok(Json(state.engine.description(&name, &user.username).await?))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<DescriptionInput>,
) -> Result<(StatusCode, Json<Description>), ServerError> {
    let description = state.engine.insert_description(payload, &user.username).await?;
    Ok((StatusCode::CREATED, Json(description)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
    Json(payload): Json<DescriptionInput>,
) -> Result<Json<Description>, ServerError> {
    let description = state
        .engine
        .update_description(&name, payload, &user.username)
        .await?;
    Ok(Json(description))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Description>, ServerError> {
    Ok(Json(state.engine.delete_description(&name, &user.username).await?))
}

/// `PUT /api/description/merge?old=…&new=…`
pub async fn merge(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<RenameQuery>,
) -> Result<Json<Description>, ServerError> {
    let description = state
        .engine
        .merge_descriptions(&query.old, &query.new, &user.username)
        .await?;
    Ok(Json(description))
}
