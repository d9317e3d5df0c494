//! The query boundary between the engine and its persisted entity set.
//!
//! Stores own shape and constraints only. Every uniqueness rule of the data
//! model is enforced by the store itself, so callers detect duplicates from
//! the write result instead of a separate existence check:
//!
//! - unique role code, action code, menu code and permission code
//! - one row per (user, role), (role, permission) and (user, permission)
//! - a role referenced by a user assignment cannot be deleted
//!
//! Constraint violations surface as [`ErrorKind::Conflict`](menuward_core::ErrorKind);
//! any other store failure surfaces as `Internal`.

use async_trait::async_trait;
use menuward_core::AppError;
use menuward_models::{
    Action, ActionId, ActionTranslation, Menu, MenuAction, MenuActionPair, MenuId, MenuTranslation,
    NewAction, NewMenu, NewPermission, NewRole, Permission, PermissionId, Role, RoleChanges,
    RoleFilter, RoleId, RolePermission, UserId, UserPermission, UserRoleAssignment,
};

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait AuthzStore: Send + Sync {
    // Roles

    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>>;

    async fn find_role_by_code(&self, code: &str) -> StoreResult<Option<Role>>;

    /// A window of roles ordered by level then code, plus the filtered total.
    async fn list_roles(
        &self,
        filter: &RoleFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<Role>, i64)>;

    /// The system role with the lowest level (ties broken by id).
    async fn top_system_role(&self) -> StoreResult<Option<Role>>;

    /// Inserts a role and grants `permission_ids` to it in one transaction.
    async fn insert_role(
        &self,
        role: &NewRole,
        permission_ids: &[PermissionId],
    ) -> StoreResult<Role>;

    /// Applies the set fields of `changes`. An empty description is stored as `NULL`.
    async fn update_role(&self, id: RoleId, changes: &RoleChanges) -> StoreResult<Role>;

    /// Returns `false` when no such role exists.
    async fn delete_role(&self, id: RoleId) -> StoreResult<bool>;

    /// Users currently assigned the role, ordered by id.
    async fn role_user_ids(&self, id: RoleId) -> StoreResult<Vec<UserId>>;

    // Menu and action catalog

    async fn insert_action(&self, action: &NewAction) -> StoreResult<Action>;

    async fn find_action(&self, id: ActionId) -> StoreResult<Option<Action>>;

    async fn actions_by_ids(&self, ids: &[ActionId]) -> StoreResult<Vec<Action>>;

    async fn insert_menu(&self, menu: &NewMenu) -> StoreResult<Menu>;

    async fn find_menu(&self, id: MenuId) -> StoreResult<Option<Menu>>;

    async fn find_menu_by_code(&self, code: &str) -> StoreResult<Option<Menu>>;

    async fn menus_by_ids(&self, ids: &[MenuId]) -> StoreResult<Vec<Menu>>;

    /// Attaches an action to a menu, replacing the display name if already attached.
    async fn attach_action(
        &self,
        menu_id: MenuId,
        action_id: ActionId,
        display_name: Option<&str>,
    ) -> StoreResult<MenuAction>;

    async fn menu_actions_for(&self, menu_ids: &[MenuId]) -> StoreResult<Vec<MenuAction>>;

    /// Every attached menu/action pair, ordered by menu code then action code.
    async fn menu_action_pairs(&self) -> StoreResult<Vec<MenuActionPair>>;

    async fn upsert_menu_translation(
        &self,
        translation: &MenuTranslation,
    ) -> StoreResult<MenuTranslation>;

    async fn upsert_action_translation(
        &self,
        translation: &ActionTranslation,
    ) -> StoreResult<ActionTranslation>;

    async fn menu_translations(
        &self,
        menu_ids: &[MenuId],
        locale: &str,
    ) -> StoreResult<Vec<MenuTranslation>>;

    async fn action_translations(
        &self,
        action_ids: &[ActionId],
        locale: &str,
    ) -> StoreResult<Vec<ActionTranslation>>;

    // Permission catalog

    async fn find_permission(&self, id: PermissionId) -> StoreResult<Option<Permission>>;

    async fn find_permission_by_code(&self, code: &str) -> StoreResult<Option<Permission>>;

    /// Permissions with the given ids, ordered by code.
    async fn permissions_by_ids(&self, ids: &[PermissionId]) -> StoreResult<Vec<Permission>>;

    /// Creates the permission unless one with the same code exists; returns the stored row.
    async fn upsert_permission(&self, permission: &NewPermission) -> StoreResult<Permission>;

    // Role grants

    async fn role_permissions(&self, role_id: RoleId) -> StoreResult<Vec<RolePermission>>;

    /// Inserts the grant or flips an existing row to `is_granted = true`.
    async fn upsert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted_by: Option<UserId>,
    ) -> StoreResult<RolePermission>;

    /// Returns `false` when there was no row to delete.
    async fn delete_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> StoreResult<bool>;

    /// Removes then grants in a single transaction.
    async fn apply_role_permission_diff(
        &self,
        role_id: RoleId,
        to_add: &[PermissionId],
        to_remove: &[PermissionId],
        granted_by: Option<UserId>,
    ) -> StoreResult<()>;

    // User roles

    async fn user_role_assignments(&self, user_id: UserId) -> StoreResult<Vec<UserRoleAssignment>>;

    /// Every role assigned to the user, active or not, ordered by level then code.
    async fn user_roles(&self, user_id: UserId) -> StoreResult<Vec<Role>>;

    /// Returns `None` when the pair was already assigned.
    async fn insert_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        assigned_by: Option<UserId>,
    ) -> StoreResult<Option<UserRoleAssignment>>;

    /// Returns `false` when the pair was not assigned.
    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<bool>;

    /// Removes then assigns in a single transaction; existing pairs are left untouched.
    async fn apply_user_role_diff(
        &self,
        user_id: UserId,
        to_add: &[RoleId],
        to_remove: &[RoleId],
        assigned_by: Option<UserId>,
    ) -> StoreResult<()>;

    // User overrides

    async fn user_permissions(&self, user_id: UserId) -> StoreResult<Vec<UserPermission>>;

    async fn find_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> StoreResult<Option<UserPermission>>;

    async fn upsert_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        is_granted: bool,
        granted_by: Option<UserId>,
    ) -> StoreResult<UserPermission>;

    /// Returns `false` when there was no row to delete.
    async fn delete_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> StoreResult<bool>;

    // Resolution facts

    /// Permission ids granted to the user through any of their active roles.
    async fn role_granted_permission_ids(&self, user_id: UserId) -> StoreResult<Vec<PermissionId>>;

    /// Whether an active role of the user grants `permission_id`.
    async fn user_has_role_grant(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> StoreResult<bool>;
}
