//! Categories API endpoints.

use api_types::{
    RenameQuery,
    category::{Category, CategoryInput},
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
) -> Result<Json<Vec<Category>>, ServerError> {
    Ok(Json(state.engine.categories_active(&user.username).await?))
}

pub async fn select_active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Category>>, ServerError> {
    non_empty(
        state.engine.categories_active(&user.username).await?,
        "categories",
    )
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Category>, ServerError> {
    Ok(Json(state.engine.category(&name, &user.username).await?))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), ServerError> {
    let category = state.engine.insert_category(payload, &user.username).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
    Json(payload): Json<CategoryInput>,
) -> Result<Json<Category>, ServerError> {
    let category = state
        .engine
        .update_category(&name, payload, &user.username)
        .await?;
    Ok(Json(category))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Category>, ServerError> {
    Ok(Json(state.engine.delete_category(&name, &user.username).await?))
}

/// `PUT /api/category/merge?old=…&new=…`
pub async fn merge(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Query(query): Query<RenameQuery>,
) -> Result<Json<Category>, ServerError> {
    let category = state
        .engine
        .merge_categories(&query.old, &query.new, &user.username)
        .await?;
    Ok(Json(category))
}
