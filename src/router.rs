use axum::{Json, Router, middleware, routing::get};
use menuward_observability::{logging_middleware, metrics_middleware};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::middleware::permission::{require_menus_manage, require_roles_view, require_users_assign};
use crate::modules::assignments::router::init_user_assignments_router;
use crate::modules::catalog::router::{init_actions_router, init_menus_router};
use crate::modules::menus::router::init_my_menus_router;
use crate::modules::permissions::router::init_me_router;
use crate::modules::roles::router::init_roles_router;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn init_router(state: AppState) -> Router {
    let roles = init_roles_router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_roles_view));
    let users = init_user_assignments_router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_users_assign));
    let menus = init_menus_router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_menus_manage));
    let actions = init_actions_router()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_menus_manage));

    let api = Router::new()
        .nest("/me", init_me_router().merge(init_my_menus_router()))
        .nest("/roles", roles)
        .nest("/users", users)
        .nest("/menus", menus)
        .nest("/actions", actions);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
