use axum::{
    Json,
    extract::{Query, State},
};
use menuward_models::{LocaleQuery, MenuSummary, MenuTreeNode};

use crate::middleware::actor::AuthUser;
use crate::state::AppState;

pub async fn get_my_menu_tree(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<LocaleQuery>,
) -> Json<Vec<MenuTreeNode>> {
    Json(
        state
            .checker
            .get_user_menu_tree(auth_user.user_id(), query.locale())
            .await,
    )
}

pub async fn get_my_menus_simple(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<LocaleQuery>,
) -> Json<Vec<MenuSummary>> {
    Json(
        state
            .checker
            .get_user_menus_simple(auth_user.user_id(), query.locale())
            .await,
    )
}
