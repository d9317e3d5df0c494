//! The same behaviors as the in-memory suites, against the real schema.
//!
//! Needs `DATABASE_URL`; run with `cargo test -- --ignored`.

use menuward::cli::{assign_role, seed_catalog};
use menuward::modules::assignments::{Actor, service as assignments};
use menuward::modules::menus::service::get_user_menu_tree;
use menuward::modules::permissions::service::{check_permission, get_user_menu_actions};
use menuward::modules::roles::service as roles;
use menuward_cache::InvalidationBus;
use menuward_core::ErrorKind;
use menuward_db::{AuthzStore, PgStore};
use menuward_models::{RoleChanges, UserId};
use sqlx::PgPool;

const ROOT: UserId = UserId::new(1);
const EDITOR: UserId = UserId::new(2);

async fn seeded(pool: PgPool) -> (PgStore, InvalidationBus) {
    let store = PgStore::new(pool);
    let bus = InvalidationBus::new(16);
    seed_catalog(&store).await.unwrap();
    assign_role(&store, &bus, ROOT, "super_admin")
        .await
        .unwrap();
    assign_role(&store, &bus, EDITOR, "editor").await.unwrap();
    (store, bus)
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_seeded_catalog_resolves(pool: PgPool) {
    let (store, _bus) = seeded(pool).await;

    assert!(check_permission(&store, ROOT, "menu.menus.update").await);
    assert!(check_permission(&store, EDITOR, "menu.posts.publish").await);
    assert!(!check_permission(&store, EDITOR, "menu.roles.view").await);

    let roots: Vec<String> = get_user_menu_tree(&store, ROOT, None)
        .await
        .into_iter()
        .map(|n| n.code)
        .collect();
    assert_eq!(roots, vec!["dashboard", "content", "admin"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_deny_override_beats_role_grant(pool: PgPool) {
    let (store, bus) = seeded(pool).await;
    let publish = store
        .find_permission_by_code("menu.posts.publish")
        .await
        .unwrap()
        .unwrap();

    assignments::revoke_permission_from_user(&store, &bus, EDITOR, publish.id, &Actor::Operator)
        .await
        .unwrap();
    assert!(!check_permission(&store, EDITOR, "menu.posts.publish").await);
    assert_eq!(
        get_user_menu_actions(&store, EDITOR, "posts").await,
        vec!["create", "delete", "update", "view"]
    );

    assignments::clear_user_permission(&store, &bus, EDITOR, publish.id)
        .await
        .unwrap();
    assert!(check_permission(&store, EDITOR, "menu.posts.publish").await);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_constraints_surface_as_conflicts(pool: PgPool) {
    let (store, bus) = seeded(pool).await;
    let editor = store.find_role_by_code("editor").await.unwrap().unwrap();

    let actor = Actor::Operator;
    let duplicate = assignments::assign_role_to_user(&store, &bus, EDITOR, editor.id, &actor)
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::Conflict);

    let in_use = roles::delete_role(&store, editor.id).await.unwrap_err();
    assert_eq!(in_use.kind(), ErrorKind::Conflict);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_sync_is_a_diff(pool: PgPool) {
    let (store, bus) = seeded(pool).await;
    let editor = store.find_role_by_code("editor").await.unwrap().unwrap();
    let admin = store.find_role_by_code("admin").await.unwrap().unwrap();

    let before = store.user_role_assignments(EDITOR).await.unwrap();
    let outcome = assignments::sync_user_roles(
        &store,
        &bus,
        EDITOR,
        &[editor.id, admin.id],
        &Actor::Operator,
    )
    .await
    .unwrap();
    assert_eq!(outcome.added, vec![admin.id]);
    assert!(outcome.removed.is_empty());

    let after = store.user_role_assignments(EDITOR).await.unwrap();
    let kept = after.iter().find(|a| a.role_id == editor.id).unwrap();
    assert_eq!(kept.assigned_at, before[0].assigned_at);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_update_role_description_keep_and_clear(pool: PgPool) {
    let (store, _bus) = seeded(pool).await;
    let editor = store.find_role_by_code("editor").await.unwrap().unwrap();

    let describe = RoleChanges {
        description: Some("Writes posts".to_string()),
        ..Default::default()
    };
    store.update_role(editor.id, &describe).await.unwrap();

    let rename = RoleChanges {
        name: Some("Writer".to_string()),
        ..Default::default()
    };
    let renamed = store.update_role(editor.id, &rename).await.unwrap();
    assert_eq!(renamed.description.as_deref(), Some("Writes posts"));

    let clear = RoleChanges {
        description: Some(String::new()),
        ..Default::default()
    };
    let cleared = store.update_role(editor.id, &clear).await.unwrap();
    assert_eq!(cleared.description, None);
}
