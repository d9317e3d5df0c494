use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use menuward_core::AppError;
use menuward_models::{
    AssignRoleToUserDto, GrantPermissionDto, PermissionId, PermissionOverride, Role,
    RoleAssignmentResponse, RoleId, SyncOutcome, SyncUserRolesDto, UserId, UserPermission,
};
use serde::Serialize;

use crate::middleware::actor::AuthUser;
use crate::state::AppState;

use super::service;

pub async fn get_user_roles(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Role>>, AppError> {
    let roles = service::list_user_roles(state.store(), user_id).await?;
    Ok(Json(roles))
}

pub async fn assign_role_to_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<UserId>,
    Json(dto): Json<AssignRoleToUserDto>,
) -> Result<(StatusCode, Json<RoleAssignmentResponse>), AppError> {
    let actor = auth_user.actor(&state).await?;
    let assignment = service::assign_role_to_user(
        state.store(),
        &state.invalidation,
        user_id,
        dto.role_id,
        &actor,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(RoleAssignmentResponse {
            message: "Role assigned successfully".to_string(),
            user_id: assignment.user_id,
            role_id: assignment.role_id,
        }),
    ))
}

pub async fn sync_user_roles(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<UserId>,
    Json(dto): Json<SyncUserRolesDto>,
) -> Result<Json<SyncOutcome<RoleId>>, AppError> {
    let actor = auth_user.actor(&state).await?;
    let outcome = service::sync_user_roles(
        state.store(),
        &state.invalidation,
        user_id,
        &dto.role_ids,
        &actor,
    )
    .await?;
    Ok(Json(outcome))
}

pub async fn remove_role_from_user(
    State(state): State<AppState>,
    Path((user_id, role_id)): Path<(UserId, RoleId)>,
) -> Result<StatusCode, AppError> {
    service::remove_role_from_user(state.store(), &state.invalidation, user_id, role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct UserPermissionsResponse {
    /// Effective permission codes after roles and overrides.
    pub permissions: Vec<String>,
    pub overrides: Vec<PermissionOverride>,
}

pub async fn get_user_permissions(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserPermissionsResponse>, AppError> {
    let overrides = service::get_user_permission_overrides(state.store(), user_id).await?;
    let permissions = state.checker.get_user_permissions(user_id).await;
    Ok(Json(UserPermissionsResponse {
        permissions,
        overrides,
    }))
}

pub async fn grant_user_permission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<UserId>,
    Json(dto): Json<GrantPermissionDto>,
) -> Result<Json<UserPermission>, AppError> {
    let actor = auth_user.actor(&state).await?;
    let row = service::grant_permission_to_user(
        state.store(),
        &state.invalidation,
        user_id,
        dto.permission_id,
        &actor,
    )
    .await?;
    Ok(Json(row))
}

pub async fn revoke_user_permission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((user_id, permission_id)): Path<(UserId, PermissionId)>,
) -> Result<Json<UserPermission>, AppError> {
    let actor = auth_user.actor(&state).await?;
    let row = service::revoke_permission_from_user(
        state.store(),
        &state.invalidation,
        user_id,
        permission_id,
        &actor,
    )
    .await?;
    Ok(Json(row))
}

pub async fn clear_user_permission(
    State(state): State<AppState>,
    Path((user_id, permission_id)): Path<(UserId, PermissionId)>,
) -> Result<StatusCode, AppError> {
    service::clear_user_permission(state.store(), &state.invalidation, user_id, permission_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
