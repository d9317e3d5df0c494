use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    attach_action, create_action, create_menu, list_menu_permissions, set_action_translation,
    set_menu_translation,
};

pub fn init_menus_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_menu))
        .route("/permissions", get(list_menu_permissions))
        .route("/{id}/actions", post(attach_action))
        .route("/{id}/translations", put(set_menu_translation))
}

pub fn init_actions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_action))
        .route("/{id}/translations", put(set_action_translation))
}
