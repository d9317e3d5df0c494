use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use menuward_core::{AppError, permissions};
use menuward_models::{
    CreateRoleDto, GrantPermissionDto, PaginatedRolesResponse, Permission, PermissionId, Role,
    RoleFilterParams, RoleId, RolePermission, RoleWithPermissions, SyncOutcome,
    SyncRolePermissionsDto, UpdateRoleDto,
};

use crate::middleware::actor::AuthUser;
use crate::middleware::permission::ensure_permission;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service;

pub async fn get_roles(
    State(state): State<AppState>,
    Query(params): Query<RoleFilterParams>,
) -> Result<Json<PaginatedRolesResponse>, AppError> {
    let roles = service::list_roles(state.store(), params).await?;
    Ok(Json(roles))
}

pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::get_role_with_permissions(state.store(), id).await?;
    Ok(Json(role))
}

pub async fn create_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<RoleWithPermissions>), AppError> {
    ensure_permission(&state, auth_user, permissions::ROLES_MANAGE).await?;
    let actor = auth_user.actor(&state).await?;
    let role = service::create_role(state.store(), dto, &actor).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn update_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<RoleId>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleDto>,
) -> Result<Json<Role>, AppError> {
    ensure_permission(&state, auth_user, permissions::ROLES_MANAGE).await?;
    let role = service::update_role(state.store(), &state.invalidation, id, dto).await?;
    Ok(Json(role))
}

pub async fn delete_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<RoleId>,
) -> Result<StatusCode, AppError> {
    ensure_permission(&state, auth_user, permissions::ROLES_MANAGE).await?;
    service::delete_role(state.store(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_role_permissions(
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
) -> Result<Json<Vec<Permission>>, AppError> {
    let permissions = service::get_role_permissions(state.store(), id).await?;
    Ok(Json(permissions))
}

pub async fn grant_role_permission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<RoleId>,
    Json(dto): Json<GrantPermissionDto>,
) -> Result<Json<RolePermission>, AppError> {
    ensure_permission(&state, auth_user, permissions::ROLES_MANAGE).await?;
    let actor = auth_user.actor(&state).await?;
    let grant = service::grant_permission_to_role(
        state.store(),
        &state.invalidation,
        id,
        dto.permission_id,
        &actor,
    )
    .await?;
    Ok(Json(grant))
}

pub async fn sync_role_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<RoleId>,
    Json(dto): Json<SyncRolePermissionsDto>,
) -> Result<Json<SyncOutcome<PermissionId>>, AppError> {
    ensure_permission(&state, auth_user, permissions::ROLES_MANAGE).await?;
    let actor = auth_user.actor(&state).await?;
    let outcome = service::sync_role_permissions(
        state.store(),
        &state.invalidation,
        id,
        &dto.permission_ids,
        &actor,
    )
    .await?;
    Ok(Json(outcome))
}

pub async fn revoke_role_permission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, permission_id)): Path<(RoleId, PermissionId)>,
) -> Result<StatusCode, AppError> {
    ensure_permission(&state, auth_user, permissions::ROLES_MANAGE).await?;
    service::revoke_permission_from_role(state.store(), &state.invalidation, id, permission_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
