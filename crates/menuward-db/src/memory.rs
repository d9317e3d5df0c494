//! In-memory [`AuthzStore`] for tests and embedded use.
//!
//! Enforces the same uniqueness and reference rules as the Postgres schema, so
//! engine behavior observed against it matches production. Each call takes
//! the lock once; multi-row writes are applied under a single write guard and
//! are therefore atomic.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use menuward_core::AppError;
use menuward_models::{
    Action, ActionId, ActionTranslation, Menu, MenuAction, MenuActionPair, MenuId, MenuTranslation,
    NewAction, NewMenu, NewPermission, NewRole, Permission, PermissionId, Role, RoleChanges,
    RoleFilter, RoleId, RolePermission, UserId, UserPermission, UserRoleAssignment, most_privileged,
};
use parking_lot::RwLock;

use crate::store::{AuthzStore, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    roles: BTreeMap<RoleId, Role>,
    actions: BTreeMap<ActionId, Action>,
    menus: BTreeMap<MenuId, Menu>,
    menu_actions: BTreeMap<(MenuId, ActionId), MenuAction>,
    menu_translations: HashMap<(MenuId, String), MenuTranslation>,
    action_translations: HashMap<(ActionId, String), ActionTranslation>,
    permissions: BTreeMap<PermissionId, Permission>,
    role_permissions: BTreeMap<(RoleId, PermissionId), RolePermission>,
    user_roles: BTreeMap<(UserId, RoleId), UserRoleAssignment>,
    user_permissions: BTreeMap<(UserId, PermissionId), UserPermission>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn granted_ids(&self, user_id: UserId) -> BTreeSet<PermissionId> {
        self.user_roles
            .range((user_id, RoleId::new(i64::MIN))..=(user_id, RoleId::new(i64::MAX)))
            .filter(|(_, a)| self.roles.get(&a.role_id).is_some_and(|r| r.is_active))
            .flat_map(|(_, a)| {
                let first = (a.role_id, PermissionId::new(i64::MIN));
                let last = (a.role_id, PermissionId::new(i64::MAX));
                self.role_permissions
                    .range(first..=last)
                    .filter(|(_, rp)| rp.is_granted)
                    .map(|(_, rp)| rp.permission_id)
            })
            .collect()
    }

    fn require_permission(&self, id: PermissionId) -> StoreResult<()> {
        if self.permissions.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::conflict(anyhow!("Permission no longer exists")))
        }
    }

    fn require_role(&self, id: RoleId) -> StoreResult<()> {
        if self.roles.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::conflict(anyhow!("Role no longer exists")))
        }
    }

    fn grant_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted_by: Option<UserId>,
    ) -> RolePermission {
        let row = RolePermission {
            role_id,
            permission_id,
            is_granted: true,
            granted_at: Utc::now(),
            granted_by,
        };
        self.role_permissions
            .insert((role_id, permission_id), row.clone());
        row
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails as if the backing database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AppError::internal(anyhow!("store unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AuthzStore for MemoryStore {
    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        self.check()?;
        Ok(self.tables.read().roles.get(&id).cloned())
    }

    async fn find_role_by_code(&self, code: &str) -> StoreResult<Option<Role>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables.roles.values().find(|r| r.code == code).cloned())
    }

    async fn list_roles(
        &self,
        filter: &RoleFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<Role>, i64)> {
        self.check()?;
        let tables = self.tables.read();
        let mut roles: Vec<Role> = tables
            .roles
            .values()
            .filter(|r| filter.is_system.is_none_or(|s| r.is_system == s))
            .filter(|r| filter.is_active.is_none_or(|a| r.is_active == a))
            .cloned()
            .collect();
        roles.sort_by(|a, b| (a.level, &a.code).cmp(&(b.level, &b.code)));

        let total = roles.len() as i64;
        let window = roles
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((window, total))
    }

    async fn top_system_role(&self) -> StoreResult<Option<Role>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(most_privileged(tables.roles.values().filter(|r| r.is_system)).cloned())
    }

    async fn insert_role(
        &self,
        role: &NewRole,
        permission_ids: &[PermissionId],
    ) -> StoreResult<Role> {
        self.check()?;
        let mut tables = self.tables.write();
        if tables.roles.values().any(|r| r.code == role.code) {
            return Err(AppError::conflict(anyhow!("Role code already exists")));
        }
        for id in permission_ids {
            tables.require_permission(*id)?;
        }

        let now = Utc::now();
        let created = Role {
            id: RoleId::new(tables.next_id()),
            code: role.code.clone(),
            name: role.name.clone(),
            description: role.description.clone(),
            level: role.level,
            is_active: role.is_active,
            is_system: role.is_system,
            created_at: now,
            updated_at: now,
            created_by: role.created_by,
        };
        tables.roles.insert(created.id, created.clone());
        for id in permission_ids {
            if !tables.role_permissions.contains_key(&(created.id, *id)) {
                tables.grant_role_permission(created.id, *id, role.created_by);
            }
        }
        Ok(created)
    }

    async fn update_role(&self, id: RoleId, changes: &RoleChanges) -> StoreResult<Role> {
        self.check()?;
        let mut tables = self.tables.write();
        let role = tables
            .roles
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;

        if let Some(name) = &changes.name {
            role.name = name.clone();
        }
        if let Some(description) = &changes.description {
            role.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if let Some(level) = changes.level {
            role.level = level;
        }
        if let Some(is_active) = changes.is_active {
            role.is_active = is_active;
        }
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn delete_role(&self, id: RoleId) -> StoreResult<bool> {
        self.check()?;
        let mut tables = self.tables.write();
        if tables.user_roles.values().any(|a| a.role_id == id) {
            return Err(AppError::conflict(anyhow!("Cannot delete role that has users assigned")));
        }
        if tables.roles.remove(&id).is_none() {
            return Ok(false);
        }
        tables
            .role_permissions
            .retain(|(role_id, _), _| *role_id != id);
        Ok(true)
    }

    async fn role_user_ids(&self, id: RoleId) -> StoreResult<Vec<UserId>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables
            .user_roles
            .values()
            .filter(|a| a.role_id == id)
            .map(|a| a.user_id)
            .collect())
    }

    async fn insert_action(&self, action: &NewAction) -> StoreResult<Action> {
        self.check()?;
        let mut tables = self.tables.write();
        if tables.actions.values().any(|a| a.code == action.code) {
            return Err(AppError::conflict(anyhow!("Action code already exists")));
        }
        let created = Action {
            id: ActionId::new(tables.next_id()),
            code: action.code.clone(),
            name: action.name.clone(),
            category: action.category.clone(),
        };
        tables.actions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_action(&self, id: ActionId) -> StoreResult<Option<Action>> {
        self.check()?;
        Ok(self.tables.read().actions.get(&id).cloned())
    }

    async fn actions_by_ids(&self, ids: &[ActionId]) -> StoreResult<Vec<Action>> {
        self.check()?;
        let tables = self.tables.read();
        let mut actions: Vec<Action> = ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| tables.actions.get(id).cloned())
            .collect();
        actions.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(actions)
    }

    async fn insert_menu(&self, menu: &NewMenu) -> StoreResult<Menu> {
        self.check()?;
        let mut tables = self.tables.write();
        if tables.menus.values().any(|m| m.code == menu.code) {
            return Err(AppError::conflict(anyhow!("Menu code already exists")));
        }
        if let Some(parent_id) = menu.parent_id {
            if !tables.menus.contains_key(&parent_id) {
                return Err(AppError::conflict(anyhow!("Parent menu no longer exists")));
            }
        }

        let now = Utc::now();
        let created = Menu {
            id: MenuId::new(tables.next_id()),
            code: menu.code.clone(),
            name: menu.name.clone(),
            path: menu.path.clone(),
            icon: menu.icon.clone(),
            parent_id: menu.parent_id,
            sort_order: menu.sort_order,
            is_active: menu.is_active,
            description: menu.description.clone(),
            badge: menu.badge.clone(),
            tooltip: menu.tooltip.clone(),
            is_external: menu.is_external,
            created_at: now,
            updated_at: now,
        };
        tables.menus.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_menu(&self, id: MenuId) -> StoreResult<Option<Menu>> {
        self.check()?;
        Ok(self.tables.read().menus.get(&id).cloned())
    }

    async fn find_menu_by_code(&self, code: &str) -> StoreResult<Option<Menu>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables.menus.values().find(|m| m.code == code).cloned())
    }

    async fn menus_by_ids(&self, ids: &[MenuId]) -> StoreResult<Vec<Menu>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| tables.menus.get(id).cloned())
            .collect())
    }

    async fn attach_action(
        &self,
        menu_id: MenuId,
        action_id: ActionId,
        display_name: Option<&str>,
    ) -> StoreResult<MenuAction> {
        self.check()?;
        let mut tables = self.tables.write();
        if !tables.menus.contains_key(&menu_id) || !tables.actions.contains_key(&action_id) {
            return Err(AppError::conflict(anyhow!("Menu or action no longer exists")));
        }
        let row = MenuAction {
            menu_id,
            action_id,
            display_name: display_name.map(str::to_string),
        };
        tables
            .menu_actions
            .insert((menu_id, action_id), row.clone());
        Ok(row)
    }

    async fn menu_actions_for(&self, menu_ids: &[MenuId]) -> StoreResult<Vec<MenuAction>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables
            .menu_actions
            .values()
            .filter(|ma| menu_ids.contains(&ma.menu_id))
            .cloned()
            .collect())
    }

    async fn menu_action_pairs(&self) -> StoreResult<Vec<MenuActionPair>> {
        self.check()?;
        let tables = self.tables.read();
        let mut pairs: Vec<MenuActionPair> = tables
            .menu_actions
            .values()
            .filter_map(|ma| {
                let menu = tables.menus.get(&ma.menu_id)?;
                let action = tables.actions.get(&ma.action_id)?;
                Some(MenuActionPair {
                    menu_id: menu.id,
                    menu_code: menu.code.clone(),
                    menu_name: menu.name.clone(),
                    action_id: action.id,
                    action_code: action.code.clone(),
                    action_name: action.name.clone(),
                    display_name: ma.display_name.clone(),
                })
            })
            .collect();
        pairs.sort_by(|a, b| (&a.menu_code, &a.action_code).cmp(&(&b.menu_code, &b.action_code)));
        Ok(pairs)
    }

    async fn upsert_menu_translation(
        &self,
        translation: &MenuTranslation,
    ) -> StoreResult<MenuTranslation> {
        self.check()?;
        let mut tables = self.tables.write();
        if !tables.menus.contains_key(&translation.menu_id) {
            return Err(AppError::conflict(anyhow!("Menu no longer exists")));
        }
        tables.menu_translations.insert(
            (translation.menu_id, translation.locale.clone()),
            translation.clone(),
        );
        Ok(translation.clone())
    }

    async fn upsert_action_translation(
        &self,
        translation: &ActionTranslation,
    ) -> StoreResult<ActionTranslation> {
        self.check()?;
        let mut tables = self.tables.write();
        if !tables.actions.contains_key(&translation.action_id) {
            return Err(AppError::conflict(anyhow!("Action no longer exists")));
        }
        tables.action_translations.insert(
            (translation.action_id, translation.locale.clone()),
            translation.clone(),
        );
        Ok(translation.clone())
    }

    async fn menu_translations(
        &self,
        menu_ids: &[MenuId],
        locale: &str,
    ) -> StoreResult<Vec<MenuTranslation>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(menu_ids
            .iter()
            .filter_map(|id| tables.menu_translations.get(&(*id, locale.to_string())))
            .cloned()
            .collect())
    }

    async fn action_translations(
        &self,
        action_ids: &[ActionId],
        locale: &str,
    ) -> StoreResult<Vec<ActionTranslation>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(action_ids
            .iter()
            .filter_map(|id| tables.action_translations.get(&(*id, locale.to_string())))
            .cloned()
            .collect())
    }

    async fn find_permission(&self, id: PermissionId) -> StoreResult<Option<Permission>> {
        self.check()?;
        Ok(self.tables.read().permissions.get(&id).cloned())
    }

    async fn find_permission_by_code(&self, code: &str) -> StoreResult<Option<Permission>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables.permissions.values().find(|p| p.code == code).cloned())
    }

    async fn permissions_by_ids(&self, ids: &[PermissionId]) -> StoreResult<Vec<Permission>> {
        self.check()?;
        let tables = self.tables.read();
        let mut permissions: Vec<Permission> = ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| tables.permissions.get(id).cloned())
            .collect();
        permissions.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(permissions)
    }

    async fn upsert_permission(&self, permission: &NewPermission) -> StoreResult<Permission> {
        self.check()?;
        let mut tables = self.tables.write();
        let code = permission.code.as_str();
        if let Some(existing) = tables.permissions.values().find(|p| p.code == code) {
            return Ok(existing.clone());
        }
        let resource_type = permission.resource_type.as_str();
        if tables.permissions.values().any(|p| {
            p.resource_type == resource_type
                && p.resource_id == permission.resource_id
                && p.action_id == permission.action_id
        }) {
            return Err(AppError::conflict(anyhow!(
                "A permission with a different code already exists for this resource and action"
            )));
        }
        if !tables.actions.contains_key(&permission.action_id) {
            return Err(AppError::conflict(anyhow!("Action no longer exists")));
        }

        let created = Permission {
            id: PermissionId::new(tables.next_id()),
            code: permission.code.clone(),
            resource_type: resource_type.to_string(),
            resource_id: permission.resource_id,
            action_id: permission.action_id,
            description: permission.description.clone(),
            created_at: Utc::now(),
        };
        tables.permissions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn role_permissions(&self, role_id: RoleId) -> StoreResult<Vec<RolePermission>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables
            .role_permissions
            .values()
            .filter(|rp| rp.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn upsert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted_by: Option<UserId>,
    ) -> StoreResult<RolePermission> {
        self.check()?;
        let mut tables = self.tables.write();
        tables.require_role(role_id)?;
        tables.require_permission(permission_id)?;
        Ok(tables.grant_role_permission(role_id, permission_id, granted_by))
    }

    async fn delete_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> StoreResult<bool> {
        self.check()?;
        let mut tables = self.tables.write();
        Ok(tables
            .role_permissions
            .remove(&(role_id, permission_id))
            .is_some())
    }

    async fn apply_role_permission_diff(
        &self,
        role_id: RoleId,
        to_add: &[PermissionId],
        to_remove: &[PermissionId],
        granted_by: Option<UserId>,
    ) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.write();
        // Validate before mutating so a failure leaves no partial diff behind.
        tables.require_role(role_id)?;
        for id in to_add {
            tables.require_permission(*id)?;
        }

        for id in to_remove {
            tables.role_permissions.remove(&(role_id, *id));
        }
        for id in to_add {
            tables.grant_role_permission(role_id, *id, granted_by);
        }
        Ok(())
    }

    async fn user_role_assignments(&self, user_id: UserId) -> StoreResult<Vec<UserRoleAssignment>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables
            .user_roles
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn user_roles(&self, user_id: UserId) -> StoreResult<Vec<Role>> {
        self.check()?;
        let tables = self.tables.read();
        let mut roles: Vec<Role> = tables
            .user_roles
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| tables.roles.get(&a.role_id).cloned())
            .collect();
        roles.sort_by(|a, b| (a.level, &a.code).cmp(&(b.level, &b.code)));
        Ok(roles)
    }

    async fn insert_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        assigned_by: Option<UserId>,
    ) -> StoreResult<Option<UserRoleAssignment>> {
        self.check()?;
        let mut tables = self.tables.write();
        tables.require_role(role_id)?;
        if tables.user_roles.contains_key(&(user_id, role_id)) {
            return Ok(None);
        }
        let row = UserRoleAssignment {
            user_id,
            role_id,
            assigned_at: Utc::now(),
            assigned_by,
        };
        tables.user_roles.insert((user_id, role_id), row.clone());
        Ok(Some(row))
    }

    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<bool> {
        self.check()?;
        let mut tables = self.tables.write();
        Ok(tables.user_roles.remove(&(user_id, role_id)).is_some())
    }

    async fn apply_user_role_diff(
        &self,
        user_id: UserId,
        to_add: &[RoleId],
        to_remove: &[RoleId],
        assigned_by: Option<UserId>,
    ) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.write();
        for id in to_add {
            tables.require_role(*id)?;
        }

        for id in to_remove {
            tables.user_roles.remove(&(user_id, *id));
        }
        let now = Utc::now();
        for id in to_add {
            tables
                .user_roles
                .entry((user_id, *id))
                .or_insert_with(|| UserRoleAssignment {
                    user_id,
                    role_id: *id,
                    assigned_at: now,
                    assigned_by,
                });
        }
        Ok(())
    }

    async fn user_permissions(&self, user_id: UserId) -> StoreResult<Vec<UserPermission>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables
            .user_permissions
            .values()
            .filter(|up| up.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> StoreResult<Option<UserPermission>> {
        self.check()?;
        let tables = self.tables.read();
        Ok(tables
            .user_permissions
            .get(&(user_id, permission_id))
            .cloned())
    }

    async fn upsert_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        is_granted: bool,
        granted_by: Option<UserId>,
    ) -> StoreResult<UserPermission> {
        self.check()?;
        let mut tables = self.tables.write();
        tables.require_permission(permission_id)?;
        let row = UserPermission {
            user_id,
            permission_id,
            is_granted,
            granted_at: Utc::now(),
            granted_by,
        };
        tables
            .user_permissions
            .insert((user_id, permission_id), row.clone());
        Ok(row)
    }

    async fn delete_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> StoreResult<bool> {
        self.check()?;
        let mut tables = self.tables.write();
        Ok(tables
            .user_permissions
            .remove(&(user_id, permission_id))
            .is_some())
    }

    async fn role_granted_permission_ids(&self, user_id: UserId) -> StoreResult<Vec<PermissionId>> {
        self.check()?;
        Ok(self.tables.read().granted_ids(user_id).into_iter().collect())
    }

    async fn user_has_role_grant(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> StoreResult<bool> {
        self.check()?;
        Ok(self
            .tables
            .read()
            .granted_ids(user_id)
            .contains(&permission_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuward_core::ErrorKind;
    use menuward_core::permissions::ResourceType;

    fn new_role(code: &str) -> NewRole {
        NewRole {
            code: code.to_string(),
            name: code.to_string(),
            description: None,
            level: 50,
            is_active: true,
            is_system: false,
            created_by: None,
        }
    }

    async fn seed_permission(store: &MemoryStore) -> Permission {
        let action = store
            .insert_action(&NewAction {
                code: "view".to_string(),
                name: "View".to_string(),
                category: None,
            })
            .await
            .unwrap();
        store
            .upsert_permission(&NewPermission {
                code: "menu.posts.view".to_string(),
                resource_type: ResourceType::Menu,
                resource_id: 1,
                action_id: action.id,
                description: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_role_code_conflicts() {
        let store = MemoryStore::new();
        store.insert_role(&new_role("editor"), &[]).await.unwrap();
        let err = store
            .insert_role(&new_role("editor"), &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_role_description_keep_and_clear() {
        let store = MemoryStore::new();
        let mut role = new_role("editor");
        role.description = Some("Writes posts".to_string());
        let role = store.insert_role(&role, &[]).await.unwrap();

        let rename = RoleChanges {
            name: Some("Writer".to_string()),
            ..Default::default()
        };
        let updated = store.update_role(role.id, &rename).await.unwrap();
        assert_eq!(updated.name, "Writer");
        assert_eq!(updated.description.as_deref(), Some("Writes posts"));

        let clear = RoleChanges {
            description: Some(String::new()),
            ..Default::default()
        };
        let updated = store.update_role(role.id, &clear).await.unwrap();
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn test_insert_user_role_reports_existing_pair() {
        let store = MemoryStore::new();
        let role = store.insert_role(&new_role("editor"), &[]).await.unwrap();
        let user = UserId::new(7);

        let first = store.insert_user_role(user, role.id, None).await.unwrap();
        assert!(first.is_some());
        let again = store.insert_user_role(user, role.id, None).await.unwrap();
        assert!(again.is_none());
        assert_eq!(store.user_role_assignments(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_role_with_users_conflicts() {
        let store = MemoryStore::new();
        let role = store.insert_role(&new_role("editor"), &[]).await.unwrap();
        let user = UserId::new(1);
        store.insert_user_role(user, role.id, None).await.unwrap();

        let err = store.delete_role(role.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(store.find_role(role.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upsert_permission_is_idempotent() {
        let store = MemoryStore::new();
        let first = seed_permission(&store).await;
        let again = store
            .upsert_permission(&NewPermission {
                code: first.code.clone(),
                resource_type: ResourceType::Menu,
                resource_id: 1,
                action_id: first.action_id,
                description: Some("ignored".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.description, None);
    }

    #[tokio::test]
    async fn test_inactive_role_grants_are_ignored() {
        let store = MemoryStore::new();
        let permission = seed_permission(&store).await;
        let role = store
            .insert_role(&new_role("editor"), &[permission.id])
            .await
            .unwrap();
        let user = UserId::new(3);
        store.insert_user_role(user, role.id, None).await.unwrap();
        assert!(store.user_has_role_grant(user, permission.id).await.unwrap());

        let changes = RoleChanges {
            is_active: Some(false),
            ..Default::default()
        };
        store.update_role(role.id, &changes).await.unwrap();
        assert!(!store.user_has_role_grant(user, permission.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_diff_with_unknown_permission_changes_nothing() {
        let store = MemoryStore::new();
        let permission = seed_permission(&store).await;
        let role = store
            .insert_role(&new_role("editor"), &[permission.id])
            .await
            .unwrap();

        let err = store
            .apply_role_permission_diff(role.id, &[PermissionId::new(999)], &[permission.id], None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.role_permissions(role.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let err = store.find_role(RoleId::new(1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
