use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

use super::controller::{
    create_role, delete_role, get_role, get_role_permissions, get_roles, grant_role_permission,
    revoke_role_permission, sync_role_permissions, update_role,
};

/// Every route requires `menu.roles.view`; writes also require `menu.roles.update`.
pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_roles).post(create_role))
        .route("/{id}", get(get_role).put(update_role).delete(delete_role))
        .route(
            "/{id}/permissions",
            get(get_role_permissions)
                .post(grant_role_permission)
                .put(sync_role_permissions),
        )
        .route(
            "/{id}/permissions/{permission_id}",
            delete(revoke_role_permission),
        )
}
