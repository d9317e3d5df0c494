mod common;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::Fixture;
use http_body_util::BodyExt;
use menuward::cli::{assign_role, seed_catalog};
use menuward::router::init_router;
use menuward_db::AuthzStore;
use menuward_models::UserId;
use serde_json::{Value, json};
use tower::ServiceExt;

const ROOT: i64 = 1;
const EDITOR: i64 = 2;
const NOBODY: i64 = 3;

async fn seeded_app() -> (Fixture, Router) {
    let fx = Fixture::new();
    seed_catalog(fx.store()).await.unwrap();
    assign_role(fx.store(), &fx.bus, UserId::new(ROOT), "super_admin")
        .await
        .unwrap();
    let app = init_router(fx.app_state());
    (fx, app)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (_fx, app) = seeded_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_identity_is_required() {
    let (_fx, app) = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/api/me/menus", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");

    let (status, _) = send(&app, Method::GET, "/api/roles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_require_permissions() {
    let (_fx, app) = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/api/roles", Some(NOBODY), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/actions",
        Some(NOBODY),
        Some(json!({ "code": "export", "name": "Export" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An identified user with no roles still sees their own (empty) view.
    let (status, body) = send(&app, Method::GET, "/api/me/menus", Some(NOBODY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_role_lifecycle_over_http() {
    let (_fx, app) = seeded_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/roles",
        Some(ROOT),
        Some(json!({ "code": "reviewer", "name": "Reviewer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], "reviewer");
    assert_eq!(body["is_system"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/roles",
        Some(ROOT),
        Some(json!({ "code": "reviewer", "name": "Reviewer again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/roles",
        Some(ROOT),
        Some(json!({ "code": "Bad Code", "name": "Bad" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send(&app, Method::GET, "/api/roles?limit=10", Some(ROOT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 4);
    assert_eq!(body["data"][0]["code"], "super_admin");
}

#[tokio::test]
async fn test_huge_page_returns_an_empty_window() {
    let (_fx, app) = seeded_app().await;

    let uri = format!("/api/roles?page={}", i64::MAX);
    let (status, body) = send(&app, Method::GET, &uri, Some(ROOT), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["has_more"], false);
}

#[tokio::test]
async fn test_menu_tree_for_super_admin() {
    let (_fx, app) = seeded_app().await;

    let (status, body) = send(&app, Method::GET, "/api/me/menus", Some(ROOT), None).await;
    assert_eq!(status, StatusCode::OK);
    let roots: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["code"].as_str().unwrap())
        .collect();
    assert_eq!(roots, vec!["dashboard", "content", "admin"]);

    let (_, flat) = send(&app, Method::GET, "/api/me/menus/simple", Some(ROOT), None).await;
    assert_eq!(flat.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_assign_editor_and_resolve() {
    let (fx, app) = seeded_app().await;
    let editor = fx.store.find_role_by_code("editor").await.unwrap().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/users/{EDITOR}/roles"),
        Some(ROOT),
        Some(json!({ "role_id": editor.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], EDITOR);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/me/menus/posts/actions",
        Some(EDITOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!(["create", "delete", "publish", "update", "view"])
    );

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/me/permissions/check?code=menu.posts.publish",
        Some(EDITOR),
        None,
    )
    .await;
    assert_eq!(body["allowed"], true);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/me/permissions/check?code=menu.roles.view",
        Some(EDITOR),
        None,
    )
    .await;
    assert_eq!(body["allowed"], false);

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/me/permissions/check",
        Some(EDITOR),
        Some(json!({ "codes": ["menu.posts.view", "menu.roles.view"], "mode": "all" })),
    )
    .await;
    assert_eq!(body["allowed"], false);

    // Editors cannot reach the role admin surface.
    let (status, _) = send(&app, Method::GET, "/api/roles", Some(EDITOR), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/users/{EDITOR}/roles"),
        Some(ROOT),
        Some(json!({ "role_id": editor.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn test_deny_override_over_http() {
    let (fx, app) = seeded_app().await;
    let editor = fx.store.find_role_by_code("editor").await.unwrap().unwrap();
    fx.assign(UserId::new(EDITOR), &editor).await;
    let publish = fx
        .store
        .find_permission_by_code("menu.posts.publish")
        .await
        .unwrap()
        .unwrap();

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{EDITOR}/permissions/{}", publish.id),
        Some(ROOT),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_granted"], false);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/me/menus/posts/actions",
        Some(EDITOR),
        None,
    )
    .await;
    assert_eq!(body, json!(["create", "delete", "update", "view"]));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{EDITOR}/permissions/{}/override", publish.id),
        Some(ROOT),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/me/permissions/check?code=menu.posts.publish",
        Some(EDITOR),
        None,
    )
    .await;
    assert_eq!(body["allowed"], true);
}
