use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    check_my_permission, check_my_permissions, check_my_roles, get_my_menu_actions,
    get_my_permissions, get_my_roles,
};

/// Mounted under `/me`; any identified caller may read their own view.
pub fn init_me_router() -> Router<AppState> {
    Router::new()
        .route("/permissions", get(get_my_permissions))
        .route(
            "/permissions/check",
            get(check_my_permission).post(check_my_permissions),
        )
        .route("/roles", get(get_my_roles))
        .route("/roles/check", post(check_my_roles))
        .route("/menus/{menu_code}/actions", get(get_my_menu_actions))
}
