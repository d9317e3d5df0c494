//! Seeds a demo catalog: CRUD actions, an admin and a content menu tree,
//! and three roles.
//!
//! | Role | Level | Grants |
//! |------|-------|--------|
//! | `super_admin` (system) | 1 | everything |
//! | `admin` | 10 | everything except menu administration |
//! | `editor` | 50 | dashboard and posts |
//!
//! Seeding is skipped when `super_admin` already exists.

use std::collections::HashMap;
use std::time::Instant;

use menuward_core::AppError;
use menuward_db::AuthzStore;
use menuward_models::{Action, Menu, MenuId, NewAction, NewMenu, NewRole, Permission, PermissionId};
use tracing::info;

use crate::modules::catalog::service::attach_action_to_menu;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub actions: usize,
    pub menus: usize,
    pub permissions: usize,
    pub roles: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

const ACTIONS: &[(&str, &str)] = &[
    ("view", "View"),
    ("create", "Create"),
    ("update", "Update"),
    ("delete", "Delete"),
    ("assign", "Assign"),
    ("publish", "Publish"),
];

struct MenuSeed {
    code: &'static str,
    name: &'static str,
    path: &'static str,
    icon: &'static str,
    parent: Option<&'static str>,
    sort_order: i32,
    actions: &'static [&'static str],
}

const MENUS: &[MenuSeed] = &[
    MenuSeed {
        code: "dashboard",
        name: "Dashboard",
        path: "/dashboard",
        icon: "home",
        parent: None,
        sort_order: 1,
        actions: &["view"],
    },
    MenuSeed {
        code: "content",
        name: "Content",
        path: "/content",
        icon: "file",
        parent: None,
        sort_order: 2,
        actions: &["view"],
    },
    MenuSeed {
        code: "posts",
        name: "Posts",
        path: "/content/posts",
        icon: "edit",
        parent: Some("content"),
        sort_order: 1,
        actions: &["view", "create", "update", "delete", "publish"],
    },
    MenuSeed {
        code: "admin",
        name: "Administration",
        path: "/admin",
        icon: "settings",
        parent: None,
        sort_order: 9,
        actions: &["view"],
    },
    MenuSeed {
        code: "roles",
        name: "Roles",
        path: "/admin/roles",
        icon: "shield",
        parent: Some("admin"),
        sort_order: 1,
        actions: &["view", "create", "update", "delete"],
    },
    MenuSeed {
        code: "users",
        name: "Users",
        path: "/admin/users",
        icon: "users",
        parent: Some("admin"),
        sort_order: 2,
        actions: &["view", "assign"],
    },
    MenuSeed {
        code: "menus",
        name: "Menus",
        path: "/admin/menus",
        icon: "list",
        parent: Some("admin"),
        sort_order: 3,
        actions: &["view", "update"],
    },
];

fn codes_where(permissions: &[Permission], keep: impl Fn(&str) -> bool) -> Vec<PermissionId> {
    permissions
        .iter()
        .filter(|p| keep(&p.code))
        .map(|p| p.id)
        .collect()
}

pub async fn seed_catalog(store: &dyn AuthzStore) -> Result<SeedReport, AppError> {
    if store.find_role_by_code("super_admin").await?.is_some() {
        info!("Catalog already seeded, skipping");
        return Ok(SeedReport::default());
    }

    let start = Instant::now();
    let mut report = SeedReport::default();

    let mut actions: HashMap<&str, Action> = HashMap::new();
    for (code, name) in ACTIONS {
        let action = store
            .insert_action(&NewAction {
                code: code.to_string(),
                name: name.to_string(),
                category: Some("crud".to_string()),
            })
            .await?;
        actions.insert(*code, action);
        report.actions += 1;
    }

    let mut menus: HashMap<&str, Menu> = HashMap::new();
    let mut permissions = Vec::new();
    for seed in MENUS {
        let parent_id: Option<MenuId> = seed.parent.and_then(|p| menus.get(p)).map(|m| m.id);
        let menu = store
            .insert_menu(&NewMenu {
                code: seed.code.to_string(),
                name: seed.name.to_string(),
                path: Some(seed.path.to_string()),
                icon: Some(seed.icon.to_string()),
                parent_id,
                sort_order: seed.sort_order,
                is_active: true,
                ..Default::default()
            })
            .await?;
        report.menus += 1;

        for action_code in seed.actions {
            if let Some(action) = actions.get(action_code) {
                let attached = attach_action_to_menu(store, menu.id, action.id, None).await?;
                permissions.push(attached.permission);
            }
        }
        menus.insert(seed.code, menu);
    }
    report.permissions = permissions.len();

    let roles = [
        (
            "super_admin",
            "Super Admin",
            1,
            true,
            codes_where(&permissions, |_| true),
        ),
        (
            "admin",
            "Administrator",
            10,
            false,
            codes_where(&permissions, |c| !c.starts_with("menu.menus.")),
        ),
        (
            "editor",
            "Editor",
            50,
            false,
            codes_where(&permissions, |c| {
                c == "menu.dashboard.view"
                    || c == "menu.content.view"
                    || c.starts_with("menu.posts.")
            }),
        ),
    ];

    for (code, name, level, is_system, grants) in roles {
        store
            .insert_role(
                &NewRole {
                    code: code.to_string(),
                    name: name.to_string(),
                    description: None,
                    level,
                    is_active: true,
                    is_system,
                    created_by: None,
                },
                &grants,
            )
            .await?;
        report.roles += 1;
    }

    info!(
        actions = report.actions,
        menus = report.menus,
        permissions = report.permissions,
        roles = report.roles,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Catalog seeded"
    );
    Ok(report)
}
