use std::collections::{BTreeSet, HashMap};

use anyhow::anyhow;
use menuward_cache::InvalidationBus;
use menuward_core::AppError;
use menuward_db::AuthzStore;
use menuward_models::{
    PermissionId, PermissionOverride, Role, RoleId, SyncOutcome, UserId, UserPermission,
    UserRoleAssignment,
};
use menuward_observability::track_assignment_change;
use tracing::{info, instrument};

use super::guard::{Actor, ensure_may_assign};
use super::invalidate_menus;
use crate::modules::roles::service::{require_permissions, require_role};

fn require_user(user_id: UserId) -> Result<(), AppError> {
    if !user_id.is_set() {
        return Err(AppError::bad_request(anyhow!("User id is required")));
    }
    Ok(())
}

fn ensure_active(role: &Role) -> Result<(), AppError> {
    if !role.is_active {
        return Err(AppError::bad_request(anyhow!(
            "Role {} is inactive and cannot be assigned",
            role.code
        )));
    }
    Ok(())
}

#[instrument(skip(store, bus))]
pub async fn assign_role_to_user(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    user_id: UserId,
    role_id: RoleId,
    actor: &Actor,
) -> Result<UserRoleAssignment, AppError> {
    require_user(user_id)?;
    let role = require_role(store, role_id).await?;
    ensure_active(&role)?;
    ensure_may_assign(store, actor, &[&role]).await?;

    let assignment = store
        .insert_user_role(user_id, role_id, actor.user_id())
        .await?
        .ok_or_else(|| AppError::conflict(anyhow!("User already has this role")))?;

    track_assignment_change("assign_role");
    invalidate_menus(bus, [user_id]).await;
    info!(user_id = %user_id, role = %role.code, "Role assigned");

    Ok(assignment)
}

#[instrument(skip(store, bus))]
pub async fn remove_role_from_user(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    user_id: UserId,
    role_id: RoleId,
) -> Result<(), AppError> {
    require_user(user_id)?;
    if !role_id.is_set() {
        return Err(AppError::bad_request(anyhow!("Role id is required")));
    }

    if !store.delete_user_role(user_id, role_id).await? {
        return Err(AppError::not_found(anyhow!("User does not have this role")));
    }

    track_assignment_change("remove_role");
    invalidate_menus(bus, [user_id]).await;
    Ok(())
}

/// Makes the user's role set exactly `desired`. Assignments kept across the
/// sync retain their original `assigned_at`.
#[instrument(skip(store, bus))]
pub async fn sync_user_roles(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    user_id: UserId,
    desired: &[RoleId],
    actor: &Actor,
) -> Result<SyncOutcome<RoleId>, AppError> {
    require_user(user_id)?;
    let desired: BTreeSet<RoleId> = desired.iter().copied().collect();

    let current: BTreeSet<RoleId> = store
        .user_role_assignments(user_id)
        .await?
        .into_iter()
        .map(|a| a.role_id)
        .collect();

    let added: Vec<RoleId> = desired.difference(&current).copied().collect();
    let removed: Vec<RoleId> = current.difference(&desired).copied().collect();

    let mut new_roles = Vec::with_capacity(added.len());
    for role_id in &added {
        let role = require_role(store, *role_id).await?;
        ensure_active(&role)?;
        new_roles.push(role);
    }
    let refs: Vec<&Role> = new_roles.iter().collect();
    ensure_may_assign(store, actor, &refs).await?;

    let outcome = SyncOutcome { added, removed };
    if outcome.is_noop() {
        return Ok(outcome);
    }

    store
        .apply_user_role_diff(user_id, &outcome.added, &outcome.removed, actor.user_id())
        .await?;
    track_assignment_change("sync_user_roles");
    invalidate_menus(bus, [user_id]).await;

    Ok(outcome)
}

async fn set_override(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    user_id: UserId,
    permission_id: PermissionId,
    is_granted: bool,
    actor: &Actor,
) -> Result<UserPermission, AppError> {
    require_user(user_id)?;
    require_permissions(store, &[permission_id]).await?;

    let row = store
        .upsert_user_permission(user_id, permission_id, is_granted, actor.user_id())
        .await?;
    invalidate_menus(bus, [user_id]).await;
    Ok(row)
}

/// Records a grant override; it beats the absence of any role grant.
#[instrument(skip(store, bus))]
pub async fn grant_permission_to_user(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    user_id: UserId,
    permission_id: PermissionId,
    actor: &Actor,
) -> Result<UserPermission, AppError> {
    let row = set_override(store, bus, user_id, permission_id, true, actor).await?;
    track_assignment_change("grant_user_permission");
    Ok(row)
}

/// Records a deny override; it beats every role grant.
#[instrument(skip(store, bus))]
pub async fn revoke_permission_from_user(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    user_id: UserId,
    permission_id: PermissionId,
    actor: &Actor,
) -> Result<UserPermission, AppError> {
    let row = set_override(store, bus, user_id, permission_id, false, actor).await?;
    track_assignment_change("revoke_user_permission");
    Ok(row)
}

/// Drops the override so the user falls back to their roles.
#[instrument(skip(store, bus))]
pub async fn clear_user_permission(
    store: &dyn AuthzStore,
    bus: &InvalidationBus,
    user_id: UserId,
    permission_id: PermissionId,
) -> Result<(), AppError> {
    require_user(user_id)?;
    if !permission_id.is_set() {
        return Err(AppError::bad_request(anyhow!("Permission id is required")));
    }

    if !store.delete_user_permission(user_id, permission_id).await? {
        return Err(AppError::not_found(anyhow!("User has no override for this permission")));
    }

    track_assignment_change("clear_user_permission");
    invalidate_menus(bus, [user_id]).await;
    Ok(())
}

/// Direct overrides of the user joined with their codes, ordered by code.
#[instrument(skip(store))]
pub async fn get_user_permission_overrides(
    store: &dyn AuthzStore,
    user_id: UserId,
) -> Result<Vec<PermissionOverride>, AppError> {
    require_user(user_id)?;

    let rows = store.user_permissions(user_id).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<PermissionId> = rows.iter().map(|r| r.permission_id).collect();
    let codes: HashMap<PermissionId, String> = store
        .permissions_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p.code))
        .collect();

    let mut overrides: Vec<PermissionOverride> = rows
        .into_iter()
        .filter_map(|row| {
            let code = codes.get(&row.permission_id)?.clone();
            Some(PermissionOverride {
                permission_id: row.permission_id,
                state: row.state(),
                code,
                granted_at: row.granted_at,
                granted_by: row.granted_by,
            })
        })
        .collect();
    overrides.sort_by(|a, b| a.code.cmp(&b.code));

    Ok(overrides)
}

/// Every role assigned to the user, for the admin surface.
#[instrument(skip(store))]
pub async fn list_user_roles(
    store: &dyn AuthzStore,
    user_id: UserId,
) -> Result<Vec<Role>, AppError> {
    require_user(user_id)?;
    store.user_roles(user_id).await
}
