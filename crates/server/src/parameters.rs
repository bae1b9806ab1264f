use api_types::parameter::{Parameter, ParameterInput};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth::CurrentUser, non_empty, server::ServerState};

pub async fn active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Parameter>>, ServerError> {
    Ok(Json(state.engine.parameters_active(&user.username).await?))
}

pub async fn select_active(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Parameter>>, ServerError> {
    non_empty(
        state.engine.parameters_active(&user.username).await?,
        "parameters",
    )
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Parameter>, ServerError> {
    Ok(Json(state.engine.parameter(&name, &user.username).await?))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ParameterInput>,
) -> Result<(StatusCode, Json<Parameter>), ServerError> {
    let parameter = state
        .engine
        .insert_parameter(payload, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(parameter)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
    Json(payload): Json<ParameterInput>,
) -> Result<Json<Parameter>, ServerError> {
    let parameter = state
        .engine
        .update_parameter(&name, payload, &user.username)
        .await?;
    Ok(Json(parameter))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Parameter>, ServerError> {
    Ok(Json(
        state.engine.delete_parameter(&name, &user.username).await?,
    ))
}
