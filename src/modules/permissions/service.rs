//! Permission resolution.
//!
//! A user holds a permission when no deny override exists for the pair and
//! either an active role of the user grants it or a grant override exists.
//! Nothing here raises: bad input and store failures resolve to `false` or
//! an empty result, and store failures are logged.

use std::collections::BTreeSet;

use menuward_core::{AppError, PermissionCode};
use menuward_db::AuthzStore;
use menuward_models::{ActionId, PermissionId, PermissionState, Role, UserId};
use menuward_observability::track_permission_check;
use tracing::{instrument, warn};

/// Role grants plus grant overrides, minus deny overrides.
pub(crate) async fn effective_permission_ids(
    store: &dyn AuthzStore,
    user_id: UserId,
) -> Result<BTreeSet<PermissionId>, AppError> {
    let mut ids: BTreeSet<PermissionId> = store
        .role_granted_permission_ids(user_id)
        .await?
        .into_iter()
        .collect();

    for row in store.user_permissions(user_id).await? {
        match row.state() {
            PermissionState::Grant => {
                ids.insert(row.permission_id);
            }
            PermissionState::Deny => {
                ids.remove(&row.permission_id);
            }
            PermissionState::Unset => {}
        }
    }

    Ok(ids)
}

async fn effective_codes(
    store: &dyn AuthzStore,
    user_id: UserId,
) -> Result<BTreeSet<String>, AppError> {
    let ids: Vec<PermissionId> = effective_permission_ids(store, user_id)
        .await?
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Ok(BTreeSet::new());
    }
    let permissions = store.permissions_by_ids(&ids).await?;
    Ok(permissions.into_iter().map(|p| p.code).collect())
}

async fn resolve(store: &dyn AuthzStore, user_id: UserId, code: &str) -> Result<bool, AppError> {
    let Some(permission) = store.find_permission_by_code(code).await? else {
        return Ok(false);
    };

    let row = store.find_user_permission(user_id, permission.id).await?;
    match PermissionState::from_row(row.map(|r| r.is_granted)) {
        PermissionState::Deny => Ok(false),
        PermissionState::Grant => Ok(true),
        PermissionState::Unset => store.user_has_role_grant(user_id, permission.id).await,
    }
}

/// Malformed codes are denied without touching the store.
#[instrument(skip(store))]
pub async fn check_permission(store: &dyn AuthzStore, user_id: UserId, code: &str) -> bool {
    if !user_id.is_set() || code.parse::<PermissionCode>().is_err() {
        return false;
    }

    let allowed = match resolve(store, user_id, code).await {
        Ok(allowed) => allowed,
        Err(e) => {
            warn!(user_id = %user_id, code, error = %e, "Permission check failed, denying");
            false
        }
    };
    track_permission_check(allowed);
    allowed
}

/// Every permission code the user holds, sorted.
#[instrument(skip(store))]
pub async fn get_user_permissions(store: &dyn AuthzStore, user_id: UserId) -> Vec<String> {
    if !user_id.is_set() {
        return Vec::new();
    }

    match effective_codes(store, user_id).await {
        Ok(codes) => codes.into_iter().collect(),
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to load user permissions");
            Vec::new()
        }
    }
}

async fn held_codes(store: &dyn AuthzStore, user_id: UserId) -> Option<BTreeSet<String>> {
    match effective_codes(store, user_id).await {
        Ok(codes) => Some(codes),
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to load user permissions");
            None
        }
    }
}

/// True when the user holds at least one of `codes`. An empty list is `false`.
#[instrument(skip(store))]
pub async fn check_any_permission(
    store: &dyn AuthzStore,
    user_id: UserId,
    codes: &[String],
) -> bool {
    if !user_id.is_set() || codes.is_empty() {
        return false;
    }
    let allowed = held_codes(store, user_id)
        .await
        .is_some_and(|held| codes.iter().any(|c| held.contains(c)));
    track_permission_check(allowed);
    allowed
}

/// True when the user holds every one of `codes`. An empty list is `false`.
#[instrument(skip(store))]
pub async fn check_all_permissions(
    store: &dyn AuthzStore,
    user_id: UserId,
    codes: &[String],
) -> bool {
    if !user_id.is_set() || codes.is_empty() {
        return false;
    }
    let allowed = held_codes(store, user_id)
        .await
        .is_some_and(|held| codes.iter().all(|c| held.contains(c)));
    track_permission_check(allowed);
    allowed
}

async fn menu_action_codes(
    store: &dyn AuthzStore,
    user_id: UserId,
    menu_code: &str,
) -> Result<Vec<String>, AppError> {
    let Some(menu) = store.find_menu_by_code(menu_code).await? else {
        return Ok(Vec::new());
    };
    if !menu.is_active {
        return Ok(Vec::new());
    }

    let ids: Vec<PermissionId> = effective_permission_ids(store, user_id)
        .await?
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let action_ids: Vec<ActionId> = store
        .permissions_by_ids(&ids)
        .await?
        .into_iter()
        .filter(|p| p.is_menu() && p.resource_id == menu.id.into_inner())
        .map(|p| p.action_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if action_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut codes: Vec<String> = store
        .actions_by_ids(&action_ids)
        .await?
        .into_iter()
        .map(|a| a.code)
        .collect();
    codes.sort();
    Ok(codes)
}

/// Action codes the user may perform on the menu, sorted.
#[instrument(skip(store))]
pub async fn get_user_menu_actions(
    store: &dyn AuthzStore,
    user_id: UserId,
    menu_code: &str,
) -> Vec<String> {
    if !user_id.is_set() || menu_code.trim().is_empty() {
        return Vec::new();
    }

    match menu_action_codes(store, user_id, menu_code).await {
        Ok(codes) => codes,
        Err(e) => {
            warn!(user_id = %user_id, menu_code, error = %e, "Failed to load menu actions");
            Vec::new()
        }
    }
}

/// Every role assigned to the user, active or not, ordered by level then code.
#[instrument(skip(store))]
pub async fn get_user_roles(store: &dyn AuthzStore, user_id: UserId) -> Vec<Role> {
    if !user_id.is_set() {
        return Vec::new();
    }

    match store.user_roles(user_id).await {
        Ok(roles) => roles,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to load user roles");
            Vec::new()
        }
    }
}

async fn active_role_codes(store: &dyn AuthzStore, user_id: UserId) -> BTreeSet<String> {
    get_user_roles(store, user_id)
        .await
        .into_iter()
        .filter(|r| r.is_active)
        .map(|r| r.code)
        .collect()
}

/// Whether the user holds the active role `code`.
#[instrument(skip(store))]
pub async fn has_role(store: &dyn AuthzStore, user_id: UserId, code: &str) -> bool {
    if code.trim().is_empty() {
        return false;
    }
    active_role_codes(store, user_id).await.contains(code)
}

#[instrument(skip(store))]
pub async fn has_any_role(store: &dyn AuthzStore, user_id: UserId, codes: &[String]) -> bool {
    if codes.is_empty() {
        return false;
    }
    let held = active_role_codes(store, user_id).await;
    codes.iter().any(|c| held.contains(c))
}

#[instrument(skip(store))]
pub async fn has_all_roles(store: &dyn AuthzStore, user_id: UserId, codes: &[String]) -> bool {
    if codes.is_empty() {
        return false;
    }
    let held = active_role_codes(store, user_id).await;
    codes.iter().all(|c| held.contains(c))
}
