use axum::{
    Json,
    extract::{Path, Query, State},
};
use menuward_models::Role;
use serde::{Deserialize, Serialize};

use crate::middleware::actor::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub code: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Any,
    All,
}

#[derive(Debug, Deserialize)]
pub struct BatchCheckRequest {
    pub codes: Vec<String>,
    #[serde(default)]
    pub mode: MatchMode,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
}

pub async fn get_my_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Json<Vec<String>> {
    Json(state.checker.get_user_permissions(auth_user.user_id()).await)
}

pub async fn check_my_permission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<CheckQuery>,
) -> Json<CheckResponse> {
    let allowed = state
        .checker
        .check_permission(auth_user.user_id(), &query.code)
        .await;
    Json(CheckResponse { allowed })
}

pub async fn check_my_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<BatchCheckRequest>,
) -> Json<CheckResponse> {
    let user_id = auth_user.user_id();
    let checker = &state.checker;
    let allowed = match req.mode {
        MatchMode::Any => checker.check_any_permission(user_id, &req.codes).await,
        MatchMode::All => checker.check_all_permissions(user_id, &req.codes).await,
    };
    Json(CheckResponse { allowed })
}

pub async fn get_my_menu_actions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(menu_code): Path<String>,
) -> Json<Vec<String>> {
    Json(
        state
            .checker
            .get_user_menu_actions(auth_user.user_id(), &menu_code)
            .await,
    )
}

pub async fn get_my_roles(State(state): State<AppState>, auth_user: AuthUser) -> Json<Vec<Role>> {
    Json(state.checker.get_user_roles(auth_user.user_id()).await)
}

pub async fn check_my_roles(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<BatchCheckRequest>,
) -> Json<CheckResponse> {
    let user_id = auth_user.user_id();
    let allowed = match req.mode {
        MatchMode::Any => state.checker.has_any_role(user_id, &req.codes).await,
        MatchMode::All => state.checker.has_all_roles(user_id, &req.codes).await,
    };
    Json(CheckResponse { allowed })
}
