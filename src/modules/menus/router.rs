use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_my_menu_tree, get_my_menus_simple};

/// Mounted under `/me` next to the permission routes.
pub fn init_my_menus_router() -> Router<AppState> {
    Router::new()
        .route("/menus", get(get_my_menu_tree))
        .route("/menus/simple", get(get_my_menus_simple))
}
