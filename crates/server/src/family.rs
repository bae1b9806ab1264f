//! Family members that medical expenses can be attributed to.

use api_types::{
    FamilyRelationship,
    family::{FamilyMember, FamilyMemberInput},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth::CurrentUser, server::ServerState};

pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<FamilyMember>>, ServerError> {
    Ok(Json(state.engine.family_members(&user.username).await?))
}

pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<FamilyMember>, ServerError> {
    Ok(Json(state.engine.family_member(id, &user.username).await?))
}

pub async fn by_owner(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<FamilyMember>>, ServerError> {
    let members = state
        .engine
        .family_members_by_owner(&owner, &user.username)
        .await?;
    Ok(Json(members))
}

pub async fn by_owner_and_relationship(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path((owner, relationship)): Path<(String, String)>,
) -> Result<Json<Vec<FamilyMember>>, ServerError> {
    let relationship: FamilyRelationship = relationship.parse()?;
    let members = state
        .engine
        .family_members_by_relationship(&owner, relationship, &user.username)
        .await?;
    Ok(Json(members))
}

pub async fn insert(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<FamilyMemberInput>,
) -> Result<(StatusCode, Json<FamilyMember>), ServerError> {
    let member = state
        .engine
        .insert_family_member(payload, &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<FamilyMemberInput>,
) -> Result<Json<FamilyMember>, ServerError> {
    let member = state
        .engine
        .update_family_member(id, payload, &user.username)
        .await?;
    Ok(Json(member))
}

pub async fn activate(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<FamilyMember>, ServerError> {
    let member = state
        .engine
        .set_family_member_active(id, true, &user.username)
        .await?;
    Ok(Json(member))
}

pub async fn deactivate(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<FamilyMember>, ServerError> {
    let member = state
        .engine
        .set_family_member_active(id, false, &user.username)
        .await?;
    Ok(Json(member))
}

pub async fn delete(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<FamilyMember>, ServerError> {
    Ok(Json(
        state.engine.delete_family_member(id, &user.username).await?,
    ))
}
