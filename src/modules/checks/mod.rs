//! Read-only authorization facade.
//!
//! [`PermissionChecker`] bundles the resolver and the menu tree builder
//! behind one cloneable handle. Every method is total: unknown users,
//! unknown codes and store failures answer "no" or empty.

use std::sync::Arc;

use menuward_db::AuthzStore;
use menuward_models::{MenuSummary, MenuTreeNode, Role, UserId};

use crate::modules::menus::service as menus;
use crate::modules::permissions::service as permissions;

#[derive(Clone)]
pub struct PermissionChecker {
    store: Arc<dyn AuthzStore>,
}

impl PermissionChecker {
    pub fn new(store: Arc<dyn AuthzStore>) -> Self {
        Self { store }
    }

    pub async fn check_permission(&self, user_id: UserId, code: &str) -> bool {
        permissions::check_permission(self.store.as_ref(), user_id, code).await
    }

    pub async fn check_any_permission(&self, user_id: UserId, codes: &[String]) -> bool {
        permissions::check_any_permission(self.store.as_ref(), user_id, codes).await
    }

    pub async fn check_all_permissions(&self, user_id: UserId, codes: &[String]) -> bool {
        permissions::check_all_permissions(self.store.as_ref(), user_id, codes).await
    }

    pub async fn get_user_permissions(&self, user_id: UserId) -> Vec<String> {
        permissions::get_user_permissions(self.store.as_ref(), user_id).await
    }

    pub async fn get_user_menu_actions(&self, user_id: UserId, menu_code: &str) -> Vec<String> {
        permissions::get_user_menu_actions(self.store.as_ref(), user_id, menu_code).await
    }

    pub async fn get_user_menu_tree(
        &self,
        user_id: UserId,
        locale: Option<&str>,
    ) -> Vec<MenuTreeNode> {
        menus::get_user_menu_tree(self.store.as_ref(), user_id, locale).await
    }

    pub async fn get_user_menus_simple(
        &self,
        user_id: UserId,
        locale: Option<&str>,
    ) -> Vec<MenuSummary> {
        menus::get_user_menus_simple(self.store.as_ref(), user_id, locale).await
    }

    pub async fn get_user_roles(&self, user_id: UserId) -> Vec<Role> {
        permissions::get_user_roles(self.store.as_ref(), user_id).await
    }

    pub async fn has_role(&self, user_id: UserId, code: &str) -> bool {
        permissions::has_role(self.store.as_ref(), user_id, code).await
    }

    pub async fn has_any_role(&self, user_id: UserId, codes: &[String]) -> bool {
        permissions::has_any_role(self.store.as_ref(), user_id, codes).await
    }

    pub async fn has_all_roles(&self, user_id: UserId, codes: &[String]) -> bool {
        permissions::has_all_roles(self.store.as_ref(), user_id, codes).await
    }
}
