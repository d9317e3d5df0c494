mod common;

use common::Fixture;
use menuward::modules::assignments::{Actor, service as assignments};
use menuward::modules::catalog::service::{
    attach_action_to_menu, set_action_translation, set_menu_translation,
};
use menuward::modules::menus::service::{get_user_menu_tree, get_user_menus_simple};
use menuward_db::AuthzStore;
use menuward_models::{MenuTreeNode, NewMenu, TranslationDto, UserId};

const ALICE: UserId = UserId::new(1);

fn codes(nodes: &[MenuTreeNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.code.as_str()).collect()
}

fn action_names(node: &MenuTreeNode) -> Vec<&str> {
    node.actions.iter().map(|a| a.name.as_str()).collect()
}

#[tokio::test]
async fn test_tree_contains_only_held_menus() {
    let fx = Fixture::new();
    let view = fx.action("view").await;
    let content = fx.menu("content", "Content", None, 1).await;
    let posts = fx.menu("posts", "Posts", Some(content.id), 1).await;
    let pages = fx.menu("pages", "Pages", Some(content.id), 2).await;

    let content_view = fx.permission(&content, &view).await;
    let posts_view = fx.permission(&posts, &view).await;
    fx.permission(&pages, &view).await;

    let grants = [content_view.id, posts_view.id];
    let editor = fx.role("editor", 50, &grants).await;
    fx.assign(ALICE, &editor).await;

    let tree = get_user_menu_tree(fx.store(), ALICE, None).await;
    assert_eq!(codes(&tree), vec!["content"]);
    assert_eq!(codes(&tree[0].children), vec!["posts"]);
    assert_eq!(tree[0].children[0].actions.len(), 1);
    assert!(tree[0].children[0].actions[0].has_permission);
}

#[tokio::test]
async fn test_orphans_are_omitted() {
    let fx = Fixture::new();
    let view = fx.action("view").await;
    let content = fx.menu("content", "Content", None, 1).await;
    let posts = fx.menu("posts", "Posts", Some(content.id), 1).await;
    let drafts = fx.menu("drafts", "Drafts", Some(posts.id), 1).await;
    let dashboard = fx.menu("dashboard", "Dashboard", None, 0).await;

    fx.permission(&content, &view).await;
    let posts_view = fx.permission(&posts, &view).await;
    let drafts_view = fx.permission(&drafts, &view).await;
    let dashboard_view = fx.permission(&dashboard, &view).await;

    // Parent `content` is not held, so posts and its subtree are unreachable.
    let grants = [posts_view.id, drafts_view.id, dashboard_view.id];
    let role = fx.role("writer", 50, &grants).await;
    fx.assign(ALICE, &role).await;

    let tree = get_user_menu_tree(fx.store(), ALICE, None).await;
    assert_eq!(codes(&tree), vec!["dashboard"]);
    assert!(tree[0].children.is_empty());

    let flat = get_user_menus_simple(fx.store(), ALICE, None).await;
    assert_eq!(flat.len(), 1);
}

#[tokio::test]
async fn test_sibling_ordering_at_every_depth() {
    let fx = Fixture::new();
    let view = fx.action("view").await;
    let root_b = fx.menu("root_b", "Beta", None, 2).await;
    let root_a = fx.menu("root_a", "Alpha", None, 2).await;
    let root_first = fx.menu("root_first", "Zed", None, 1).await;
    let child_2 = fx.menu("child_2", "Second", Some(root_a.id), 2).await;
    let child_1 = fx.menu("child_1", "First", Some(root_a.id), 1).await;
    let leaf_b = fx.menu("leaf_b", "Same", Some(child_1.id), 0).await;
    let leaf_a = fx.menu("leaf_a", "Same", Some(child_1.id), 0).await;

    let mut grants = Vec::new();
    for menu in [
        &root_b,
        &root_a,
        &root_first,
        &child_2,
        &child_1,
        &leaf_b,
        &leaf_a,
    ] {
        grants.push(fx.permission(menu, &view).await.id);
    }
    let role = fx.role("viewer", 50, &grants).await;
    fx.assign(ALICE, &role).await;

    let tree = get_user_menu_tree(fx.store(), ALICE, None).await;
    assert_eq!(codes(&tree), vec!["root_first", "root_a", "root_b"]);
    assert_eq!(codes(&tree[1].children), vec!["child_1", "child_2"]);
    // Equal sort order and name: lower id first.
    let leaves = &tree[1].children[0].children;
    assert_eq!(codes(leaves), vec!["leaf_b", "leaf_a"]);

    let flat: Vec<String> = get_user_menus_simple(fx.store(), ALICE, None)
        .await
        .into_iter()
        .map(|m| m.code)
        .collect();
    assert_eq!(
        flat,
        vec![
            "root_first",
            "root_a",
            "child_1",
            "leaf_b",
            "leaf_a",
            "child_2",
            "root_b",
        ]
    );
}

#[tokio::test]
async fn test_actions_sorted_and_denied_actions_hidden() {
    let fx = Fixture::new();
    let menu = fx.menu("posts", "Posts", None, 1).await;
    let view = fx.permission(&menu, &fx.action("view").await).await;
    let create = fx.permission(&menu, &fx.action("create").await).await;
    let delete = fx.permission(&menu, &fx.action("delete").await).await;

    let grants = [view.id, create.id, delete.id];
    let role = fx.role("editor", 50, &grants).await;
    fx.assign(ALICE, &role).await;

    let tree = get_user_menu_tree(fx.store(), ALICE, None).await;
    let actions: Vec<&str> = tree[0].actions.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(actions, vec!["create", "delete", "view"]);

    let op = Actor::Operator;
    assignments::revoke_permission_from_user(fx.store(), &fx.bus, ALICE, delete.id, &op)
        .await
        .unwrap();
    let tree = get_user_menu_tree(fx.store(), ALICE, None).await;
    let actions: Vec<&str> = tree[0].actions.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(actions, vec!["create", "view"]);

    for id in [view.id, create.id] {
        assignments::revoke_permission_from_user(fx.store(), &fx.bus, ALICE, id, &op)
            .await
            .unwrap();
    }
    assert!(get_user_menu_tree(fx.store(), ALICE, None).await.is_empty());
}

#[tokio::test]
async fn test_inactive_menu_is_excluded() {
    let fx = Fixture::new();
    let view = fx.action("view").await;
    let hidden = fx
        .store
        .insert_menu(&NewMenu {
            code: "hidden".to_string(),
            name: "Hidden".to_string(),
            is_active: false,
            ..Default::default()
        })
        .await
        .unwrap();
    let shown = fx.menu("shown", "Shown", None, 1).await;
    let hidden_view = fx.permission(&hidden, &view).await;
    let shown_view = fx.permission(&shown, &view).await;

    let grants = [hidden_view.id, shown_view.id];
    let role = fx.role("viewer", 50, &grants).await;
    fx.assign(ALICE, &role).await;

    let tree = get_user_menu_tree(fx.store(), ALICE, None).await;
    assert_eq!(codes(&tree), vec!["shown"]);
}

#[tokio::test]
async fn test_locale_and_display_name_overlay() {
    let fx = Fixture::new();
    let menu = fx.menu("posts", "Posts", None, 1).await;
    let view = fx.action("view").await;
    let publish = fx.action("publish").await;
    let view_perm = fx.permission(&menu, &view).await;
    let publish_perm = attach_action_to_menu(fx.store(), menu.id, publish.id, Some("Go live"))
        .await
        .unwrap()
        .permission;

    set_menu_translation(
        fx.store(),
        menu.id,
        TranslationDto {
            locale: "fr".to_string(),
            name: "Articles".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    set_action_translation(
        fx.store(),
        view.id,
        TranslationDto {
            locale: "fr".to_string(),
            name: "Voir".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let grants = [view_perm.id, publish_perm.id];
    let role = fx.role("editor", 50, &grants).await;
    fx.assign(ALICE, &role).await;

    let default_tree = get_user_menu_tree(fx.store(), ALICE, None).await;
    assert_eq!(default_tree[0].name, "Posts");
    assert_eq!(action_names(&default_tree[0]), vec!["Go live", "View"]);

    let french = get_user_menu_tree(fx.store(), ALICE, Some("fr")).await;
    assert_eq!(french[0].name, "Articles");
    assert_eq!(action_names(&french[0]), vec!["Go live", "Voir"]);

    // Missing locale falls back to base names.
    let german = get_user_menu_tree(fx.store(), ALICE, Some("de")).await;
    assert_eq!(german[0].name, "Posts");
}

#[tokio::test]
async fn test_unset_user_gets_empty_tree() {
    let fx = Fixture::new();
    let tree = get_user_menu_tree(fx.store(), UserId::new(0), None).await;
    assert!(tree.is_empty());
    fx.store.set_unavailable(true);
    assert!(get_user_menu_tree(fx.store(), ALICE, None).await.is_empty());
}
