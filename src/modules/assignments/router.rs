use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

use super::controller::{
    assign_role_to_user, clear_user_permission, get_user_permissions, get_user_roles,
    grant_user_permission, remove_role_from_user, revoke_user_permission, sync_user_roles,
};

/// Mounted under `/users`.
pub fn init_user_assignments_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{user_id}/roles",
            get(get_user_roles)
                .post(assign_role_to_user)
                .put(sync_user_roles),
        )
        .route("/{user_id}/roles/{role_id}", delete(remove_role_from_user))
        .route(
            "/{user_id}/permissions",
            get(get_user_permissions).post(grant_user_permission),
        )
        .route(
            "/{user_id}/permissions/{permission_id}",
            delete(revoke_user_permission),
        )
        .route(
            "/{user_id}/permissions/{permission_id}/override",
            delete(clear_user_permission),
        )
}
