//! Route layers that admit only callers holding a permission.

use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use menuward_core::{AppError, permissions};
use tracing::debug;

use crate::middleware::actor::AuthUser;
use crate::state::AppState;

/// Fails with `Forbidden` unless `auth_user` holds `code`.
pub async fn ensure_permission(
    state: &AppState,
    auth_user: AuthUser,
    code: &str,
) -> Result<(), AppError> {
    if state.checker.check_permission(auth_user.0, code).await {
        return Ok(());
    }
    debug!(user_id = %auth_user.0, code, "Permission denied");
    Err(AppError::forbidden(anyhow!("Access denied. Required permission: {}", code)))
}

/// Middleware for `axum::middleware::from_fn_with_state`.
///
/// ```rust,ignore
/// let routes = Router::new()
///     .route("/", get(handler))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         |state, req, next| require_permission(state, req, next, permissions::MENUS_MANAGE),
///     ));
/// ```
pub async fn require_permission(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    code: &'static str,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    ensure_permission(&state, auth_user, code).await?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

pub async fn require_roles_view(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_permission(state, req, next, permissions::ROLES_VIEW).await
}

pub async fn require_users_assign(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_permission(state, req, next, permissions::USERS_ASSIGN).await
}

pub async fn require_menus_manage(
    state: State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_permission(state, req, next, permissions::MENUS_MANAGE).await
}
