//! Shared fixtures for the integration tests.
//!
//! Everything runs against `MemoryStore`, which enforces the same
//! constraints as the Postgres schema.

#![allow(dead_code)]

use std::sync::Arc;

use menuward::modules::catalog::service::attach_action_to_menu;
use menuward::state::AppState;
use menuward_cache::InvalidationBus;
use menuward_db::{AuthzStore, MemoryStore};
use menuward_models::{
    Action, Menu, MenuId, NewAction, NewMenu, NewRole, Permission, PermissionId, Role, UserId,
};

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub bus: InvalidationBus,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            bus: InvalidationBus::new(64),
        }
    }

    pub fn store(&self) -> &dyn AuthzStore {
        self.store.as_ref()
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.store.clone(), self.bus.clone())
    }

    pub async fn action(&self, code: &str) -> Action {
        self.store
            .insert_action(&NewAction {
                code: code.to_string(),
                name: title_case(code),
                category: None,
            })
            .await
            .unwrap()
    }

    pub async fn menu(
        &self,
        code: &str,
        name: &str,
        parent: Option<MenuId>,
        sort_order: i32,
    ) -> Menu {
        self.store
            .insert_menu(&NewMenu {
                code: code.to_string(),
                name: name.to_string(),
                path: Some(format!("/{}", code)),
                parent_id: parent,
                sort_order,
                is_active: true,
                ..Default::default()
            })
            .await
            .unwrap()
    }

    /// Attaches `action` to `menu` and returns the materialized permission.
    pub async fn permission(&self, menu: &Menu, action: &Action) -> Permission {
        attach_action_to_menu(self.store(), menu.id, action.id, None)
            .await
            .unwrap()
            .permission
    }

    pub async fn role(&self, code: &str, level: i32, grants: &[PermissionId]) -> Role {
        self.insert_role(code, level, false, grants).await
    }

    pub async fn system_role(&self, code: &str, level: i32, grants: &[PermissionId]) -> Role {
        self.insert_role(code, level, true, grants).await
    }

    async fn insert_role(
        &self,
        code: &str,
        level: i32,
        is_system: bool,
        grants: &[PermissionId],
    ) -> Role {
        let role = NewRole {
            code: code.to_string(),
            name: title_case(code),
            description: None,
            level,
            is_active: true,
            is_system,
            created_by: None,
        };
        self.store.insert_role(&role, grants).await.unwrap()
    }

    pub async fn assign(&self, user_id: UserId, role: &Role) {
        self.store
            .insert_user_role(user_id, role.id, None)
            .await
            .unwrap()
            .expect("role already assigned");
    }
}

fn title_case(code: &str) -> String {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) => {
            let title: String = first.to_uppercase().chain(chars).collect();
            title.replace('_', " ")
        }
        None => String::new(),
    }
}

/// The posts scenario: a `posts` menu with view/create/update/publish
/// actions, all four permissions materialized.
pub struct PostsCatalog {
    pub menu: Menu,
    pub view: Permission,
    pub create: Permission,
    pub update: Permission,
    pub publish: Permission,
}

impl PostsCatalog {
    pub async fn seed(fx: &Fixture) -> Self {
        let menu = fx.menu("posts", "Posts", None, 1).await;
        let view = fx.permission(&menu, &fx.action("view").await).await;
        let create = fx.permission(&menu, &fx.action("create").await).await;
        let update = fx.permission(&menu, &fx.action("update").await).await;
        let publish = fx.permission(&menu, &fx.action("publish").await).await;
        Self {
            menu,
            view,
            create,
            update,
            publish,
        }
    }
}

pub fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}
