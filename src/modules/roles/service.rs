//! Role catalog writes and role-level grants.
//!
//! System roles may receive grants but can never be updated or deleted.
//! Every write that changes what a role grants invalidates the menus of the
//! users holding it.

use std::collections::BTreeSet;

use anyhow::anyhow;
use menuward_cache::InvalidationBus;
use menuward_core::{AppError, PaginationMeta};
use menuward_db::AuthzStore;
use menuward_models::{
    CreateRoleDto, DEFAULT_ROLE_LEVEL, NewRole, PaginatedRolesResponse, Permission, PermissionId,
    Role, RoleChanges, RoleFilter, RoleFilterParams, RoleId, RolePermission, RoleWithPermissions,
    SyncOutcome, UpdateRoleDto,
};
use menuward_observability::track_assignment_change;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::modules::assignments::{Actor, invalidate_menus};
use crate::validator::format_errors;

pub(crate) async fn require_role(store: &dyn AuthzStore, id: RoleId) -> Result<Role, AppError> {
    if !id.is_set() {
        return Err(AppError::bad_request(anyhow!("Role id is required")));
    }
    store
        .find_role(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))
}

pub(crate) async fn require_permissions(
    store: &dyn AuthzStore,
    ids: &[PermissionId],
) -> Result<Vec<Permission>, AppError> {
    if ids.iter().any(|id| !id.is_set()) {
        return Err(AppError::bad_request(anyhow!("Permission id is required")));
    }
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let permissions = store.permissions_by_ids(ids).await?;
    if permissions.len() != ids.len() {
        return Err(AppError::not_found(anyhow!("Permission not found")));
    }
    Ok(permissions)
}

fn ensure_not_system(role: &Role) -> Result<(), AppError> {
    if role.is_system {
        return Err(AppError::forbidden(anyhow!("System roles cannot be modified")));
    }
    Ok(())
}

fn distinct<T: Ord + Copy>(ids: &[T]) -> Vec<T> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

async fn notify_holders(store: &dyn AuthzStore, bus: &InvalidationBus, role_id: RoleId) {
    match store.role_user_ids(role_id).await {
        Ok(users) => invalidate_menus(bus, users).await,
        Err(e) => {
            warn!(role_id = %role_id, error = %e, "Failed to load role holders for invalidation")
        }
    }
}

async fn granted_permissions(
    store: &dyn AuthzStore,
    role_id: RoleId,
) -> Result<Vec<Permission>, AppError> {
    let ids: Vec<PermissionId> = store
        .role_permissions(role_id)
        .await?
        .into_iter()
        .filter(|rp| rp.is_granted)
        .map(|rp| rp.permission_id)
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    store.permissions_by_ids(&ids).await
}

#[instrument(skip(store))]
pub async fn create_role(
    store: &dyn AuthzStore,
    dto: CreateRoleDto,
    actor: &Actor,
) -> Result<RoleWithPermissions, AppError> {
    dto.validate()
        .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))?;

    let permission_ids = distinct(dto.permission_ids.as_deref().unwrap_or_default());
    let permissions = require_permissions(store, &permission_ids).await?;

    let new_role = NewRole {
        code: dto.code,
        name: dto.name,
        description: dto.description,
        level: dto.level.unwrap_or(DEFAULT_ROLE_LEVEL),
        is_active: true,
        is_system: false,
        created_by: actor.user_id(),
    };
    let role = store.insert_role(&new_role, &permission_ids).await?;

    track_assignment_change("create_role");
    info!(role_id = %role.id, code = %role.code, "Role created");

    Ok(RoleWithPermissions { role, permissions })
}

#[instrument(skip(store, bus))]
pub async fn update_role(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    id: RoleId,
    dto: UpdateRoleDto,
) -> Result<Role, AppError> {
    dto.validate()
        .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))?;

    let role = require_role(store, id).await?;
    ensure_not_system(&role)?;

    let updated = store.update_role(id, &RoleChanges::from(dto)).await?;
    track_assignment_change("update_role");
    notify_holders(store, bus, id).await;

    Ok(updated)
}

#[instrument(skip(store))]
pub async fn delete_role(store: &dyn AuthzStore, id: RoleId) -> Result<(), AppError> {
    let role = require_role(store, id).await?;
    ensure_not_system(&role)?;

    if !store.role_user_ids(id).await?.is_empty() {
        return Err(AppError::conflict(anyhow!("Cannot delete role that has users assigned")));
    }

    if !store.delete_role(id).await? {
        return Err(AppError::not_found(anyhow!("Role not found")));
    }

    track_assignment_change("delete_role");
    info!(role_id = %id, "Role deleted");
    Ok(())
}

#[instrument(skip(store))]
pub async fn list_roles(
    store: &dyn AuthzStore,
    params: RoleFilterParams,
) -> Result<PaginatedRolesResponse, AppError> {
    let filter = RoleFilter {
        is_system: params.is_system,
        is_active: params.is_active,
    };
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();
    let (roles, total) = store.list_roles(&filter, limit, offset).await?;
    let meta = PaginationMeta::for_window(total, roles.len(), &params.pagination);

    Ok(PaginatedRolesResponse { data: roles, meta })
}

#[instrument(skip(store))]
pub async fn get_role_with_permissions(
    store: &dyn AuthzStore,
    id: RoleId,
) -> Result<RoleWithPermissions, AppError> {
    let role = require_role(store, id).await?;
    let permissions = granted_permissions(store, id).await?;
    Ok(RoleWithPermissions { role, permissions })
}

/// Permissions the role grants, ordered by code.
#[instrument(skip(store))]
pub async fn get_role_permissions(
    store: &dyn AuthzStore,
    id: RoleId,
) -> Result<Vec<Permission>, AppError> {
    require_role(store, id).await?;
    granted_permissions(store, id).await
}

/// Grants one permission to a role. Granting an existing grant is a no-op.
#[instrument(skip(store, bus))]
pub async fn grant_permission_to_role(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    role_id: RoleId,
    permission_id: PermissionId,
    actor: &Actor,
) -> Result<RolePermission, AppError> {
    require_role(store, role_id).await?;
    require_permissions(store, &[permission_id]).await?;

    let grant = store
        .upsert_role_permission(role_id, permission_id, actor.user_id())
        .await?;
    track_assignment_change("grant_role_permission");
    notify_holders(store, bus, role_id).await;

    Ok(grant)
}

#[instrument(skip(store, bus))]
pub async fn revoke_permission_from_role(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    role_id: RoleId,
    permission_id: PermissionId,
) -> Result<(), AppError> {
    require_role(store, role_id).await?;
    if !permission_id.is_set() {
        return Err(AppError::bad_request(anyhow!("Permission id is required")));
    }

    if !store.delete_role_permission(role_id, permission_id).await? {
        return Err(AppError::not_found(anyhow!("Role does not have this permission")));
    }
    track_assignment_change("revoke_role_permission");
    notify_holders(store, bus, role_id).await;

    Ok(())
}

/// Makes the role's granted set exactly `desired`, touching only the difference.
#[instrument(skip(store, bus))]
pub async fn sync_role_permissions(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    role_id: RoleId,
    desired: &[PermissionId],
    actor: &Actor,
) -> Result<SyncOutcome<PermissionId>, AppError> {
    require_role(store, role_id).await?;
    let desired: BTreeSet<PermissionId> = desired.iter().copied().collect();
    let desired_ids: Vec<PermissionId> = desired.iter().copied().collect();
    require_permissions(store, &desired_ids).await?;

    let current: BTreeSet<PermissionId> = store
        .role_permissions(role_id)
        .await?
        .into_iter()
        .filter(|rp| rp.is_granted)
        .map(|rp| rp.permission_id)
        .collect();

    let outcome = SyncOutcome {
        added: desired.difference(&current).copied().collect(),
        removed: current.difference(&desired).copied().collect(),
    };
    if outcome.is_noop() {
        return Ok(outcome);
    }

    store
        .apply_role_permission_diff(role_id, &outcome.added, &outcome.removed, actor.user_id())
        .await?;
    track_assignment_change("sync_role_permissions");
    notify_holders(store, bus, role_id).await;

    Ok(outcome)
}
