//! PostgreSQL-backed [`AuthzStore`].

use anyhow::anyhow;
use async_trait::async_trait;
use menuward_core::AppError;
use menuward_models::ids::raw_ids;
use menuward_models::{
    Action, ActionId, ActionTranslation, Menu, MenuAction, MenuActionPair, MenuId, MenuTranslation,
    NewAction, NewMenu, NewPermission, NewRole, Permission, PermissionId, Role, RoleChanges,
    RoleFilter, RoleId, RolePermission, UserId, UserPermission, UserRoleAssignment,
};
use sqlx::PgPool;

use crate::store::{AuthzStore, StoreResult};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unique and foreign key violations become `Conflict`; everything else is `Internal`.
fn map_db_error(err: sqlx::Error, conflict: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() || db.is_foreign_key_violation() {
            return AppError::conflict(anyhow!("{}", conflict));
        }
    }
    AppError::internal(err)
}

#[async_trait]
impl AuthzStore for PgStore {
    async fn find_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn find_role_by_code(&self, code: &str) -> StoreResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn list_roles(
        &self,
        filter: &RoleFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<Role>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM roles
             WHERE ($1::boolean IS NULL OR is_system = $1)
               AND ($2::boolean IS NULL OR is_active = $2)",
        )
        .bind(filter.is_system)
        .bind(filter.is_active)
        .fetch_one(&self.pool)
        .await?;

        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles
             WHERE ($1::boolean IS NULL OR is_system = $1)
               AND ($2::boolean IS NULL OR is_active = $2)
             ORDER BY level, code
             LIMIT $3 OFFSET $4",
        )
        .bind(filter.is_system)
        .bind(filter.is_active)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((roles, total))
    }

    async fn top_system_role(&self) -> StoreResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE is_system ORDER BY level, id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn insert_role(
        &self,
        role: &NewRole,
        permission_ids: &[PermissionId],
    ) -> StoreResult<Role> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Role>(
            "INSERT INTO roles (code, name, description, level, is_active, is_system, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&role.code)
        .bind(&role.name)
        .bind(&role.description)
        .bind(role.level)
        .bind(role.is_active)
        .bind(role.is_system)
        .bind(role.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Role code already exists"))?;

        if !permission_ids.is_empty() {
            sqlx::query(
                "INSERT INTO role_permissions (role_id, permission_id, is_granted, granted_by)
                 SELECT $1, UNNEST($2::bigint[]), TRUE, $3
                 ON CONFLICT (role_id, permission_id) DO NOTHING",
            )
            .bind(created.id)
            .bind(raw_ids(permission_ids.iter().copied()))
            .bind(role.created_by)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, "Permission no longer exists"))?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn update_role(&self, id: RoleId, changes: &RoleChanges) -> StoreResult<Role> {
        sqlx::query_as::<_, Role>(
            "UPDATE roles
             SET name = COALESCE($2, name),
                 description = CASE WHEN $3::text IS NULL THEN description
                                    ELSE NULLIF($3::text, '') END,
                 level = COALESCE($4, level),
                 is_active = COALESCE($5, is_active),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.level)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))
    }

    async fn delete_role(&self, id: RoleId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Cannot delete role that has users assigned"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn role_user_ids(&self, id: RoleId) -> StoreResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM user_roles WHERE role_id = $1 ORDER BY user_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn insert_action(&self, action: &NewAction) -> StoreResult<Action> {
        sqlx::query_as::<_, Action>(
            "INSERT INTO actions (code, name, category) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&action.code)
        .bind(&action.name)
        .bind(&action.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Action code already exists"))
    }

    async fn find_action(&self, id: ActionId) -> StoreResult<Option<Action>> {
        let action = sqlx::query_as::<_, Action>("SELECT * FROM actions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(action)
    }

    async fn actions_by_ids(&self, ids: &[ActionId]) -> StoreResult<Vec<Action>> {
        let actions =
            sqlx::query_as::<_, Action>("SELECT * FROM actions WHERE id = ANY($1) ORDER BY code")
                .bind(raw_ids(ids.iter().copied()))
                .fetch_all(&self.pool)
                .await?;
        Ok(actions)
    }

    async fn insert_menu(&self, menu: &NewMenu) -> StoreResult<Menu> {
        sqlx::query_as::<_, Menu>(
            "INSERT INTO menus (code, name, path, icon, parent_id, sort_order, is_active,
                                description, badge, tooltip, is_external)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
        .bind(&menu.code)
        .bind(&menu.name)
        .bind(&menu.path)
        .bind(&menu.icon)
        .bind(menu.parent_id)
        .bind(menu.sort_order)
        .bind(menu.is_active)
        .bind(&menu.description)
        .bind(&menu.badge)
        .bind(&menu.tooltip)
        .bind(menu.is_external)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Menu code already exists"))
    }

    async fn find_menu(&self, id: MenuId) -> StoreResult<Option<Menu>> {
        let menu = sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(menu)
    }

    async fn find_menu_by_code(&self, code: &str) -> StoreResult<Option<Menu>> {
        let menu = sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(menu)
    }

    async fn menus_by_ids(&self, ids: &[MenuId]) -> StoreResult<Vec<Menu>> {
        let menus = sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE id = ANY($1) ORDER BY id")
            .bind(raw_ids(ids.iter().copied()))
            .fetch_all(&self.pool)
            .await?;
        Ok(menus)
    }

    async fn attach_action(
        &self,
        menu_id: MenuId,
        action_id: ActionId,
        display_name: Option<&str>,
    ) -> StoreResult<MenuAction> {
        sqlx::query_as::<_, MenuAction>(
            "INSERT INTO menu_actions (menu_id, action_id, display_name)
             VALUES ($1, $2, $3)
             ON CONFLICT (menu_id, action_id) DO UPDATE SET display_name = EXCLUDED.display_name
             RETURNING *",
        )
        .bind(menu_id)
        .bind(action_id)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Menu or action no longer exists"))
    }

    async fn menu_actions_for(&self, menu_ids: &[MenuId]) -> StoreResult<Vec<MenuAction>> {
        let rows = sqlx::query_as::<_, MenuAction>(
            "SELECT * FROM menu_actions WHERE menu_id = ANY($1) ORDER BY menu_id, action_id",
        )
        .bind(raw_ids(menu_ids.iter().copied()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn menu_action_pairs(&self) -> StoreResult<Vec<MenuActionPair>> {
        let pairs = sqlx::query_as::<_, MenuActionPair>(
            "SELECT ma.menu_id, m.code AS menu_code, m.name AS menu_name,
                    ma.action_id, a.code AS action_code, a.name AS action_name,
                    ma.display_name
             FROM menu_actions ma
             JOIN menus m ON m.id = ma.menu_id
             JOIN actions a ON a.id = ma.action_id
             ORDER BY m.code, a.code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(pairs)
    }

    async fn upsert_menu_translation(
        &self,
        translation: &MenuTranslation,
    ) -> StoreResult<MenuTranslation> {
        sqlx::query_as::<_, MenuTranslation>(
            "INSERT INTO menu_translations (menu_id, locale, name, description)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (menu_id, locale)
             DO UPDATE SET name = EXCLUDED.name, description = EXCLUDED.description
             RETURNING *",
        )
        .bind(translation.menu_id)
        .bind(&translation.locale)
        .bind(&translation.name)
        .bind(&translation.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Menu no longer exists"))
    }

    async fn upsert_action_translation(
        &self,
        translation: &ActionTranslation,
    ) -> StoreResult<ActionTranslation> {
        sqlx::query_as::<_, ActionTranslation>(
            "INSERT INTO action_translations (action_id, locale, name, description)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (action_id, locale)
             DO UPDATE SET name = EXCLUDED.name, description = EXCLUDED.description
             RETURNING *",
        )
        .bind(translation.action_id)
        .bind(&translation.locale)
        .bind(&translation.name)
        .bind(&translation.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Action no longer exists"))
    }

    async fn menu_translations(
        &self,
        menu_ids: &[MenuId],
        locale: &str,
    ) -> StoreResult<Vec<MenuTranslation>> {
        let rows = sqlx::query_as::<_, MenuTranslation>(
            "SELECT * FROM menu_translations WHERE menu_id = ANY($1) AND locale = $2",
        )
        .bind(raw_ids(menu_ids.iter().copied()))
        .bind(locale)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn action_translations(
        &self,
        action_ids: &[ActionId],
        locale: &str,
    ) -> StoreResult<Vec<ActionTranslation>> {
        let rows = sqlx::query_as::<_, ActionTranslation>(
            "SELECT * FROM action_translations WHERE action_id = ANY($1) AND locale = $2",
        )
        .bind(raw_ids(action_ids.iter().copied()))
        .bind(locale)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_permission(&self, id: PermissionId) -> StoreResult<Option<Permission>> {
        let permission = sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(permission)
    }

    async fn find_permission_by_code(&self, code: &str) -> StoreResult<Option<Permission>> {
        let permission =
            sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        Ok(permission)
    }

    async fn permissions_by_ids(&self, ids: &[PermissionId]) -> StoreResult<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE id = ANY($1) ORDER BY code",
        )
        .bind(raw_ids(ids.iter().copied()))
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }

    async fn upsert_permission(&self, permission: &NewPermission) -> StoreResult<Permission> {
        // The no-op update makes RETURNING yield the existing row.
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (code, resource_type, resource_id, action_id, description)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (code) DO UPDATE SET code = EXCLUDED.code
             RETURNING *",
        )
        .bind(&permission.code)
        .bind(permission.resource_type.as_str())
        .bind(permission.resource_id)
        .bind(permission.action_id)
        .bind(&permission.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_db_error(
                e,
                "A permission with a different code already exists for this resource and action",
            )
        })
    }

    async fn role_permissions(&self, role_id: RoleId) -> StoreResult<Vec<RolePermission>> {
        let rows = sqlx::query_as::<_, RolePermission>(
            "SELECT * FROM role_permissions WHERE role_id = $1 ORDER BY permission_id",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted_by: Option<UserId>,
    ) -> StoreResult<RolePermission> {
        sqlx::query_as::<_, RolePermission>(
            "INSERT INTO role_permissions (role_id, permission_id, is_granted, granted_by)
             VALUES ($1, $2, TRUE, $3)
             ON CONFLICT (role_id, permission_id)
             DO UPDATE SET is_granted = TRUE, granted_at = NOW(), granted_by = EXCLUDED.granted_by
             RETURNING *",
        )
        .bind(role_id)
        .bind(permission_id)
        .bind(granted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Role or permission no longer exists"))
    }

    async fn delete_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2")
                .bind(role_id)
                .bind(permission_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_role_permission_diff(
        &self,
        role_id: RoleId,
        to_add: &[PermissionId],
        to_remove: &[PermissionId],
        granted_by: Option<UserId>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        if !to_remove.is_empty() {
            sqlx::query(
                "DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = ANY($2)",
            )
            .bind(role_id)
            .bind(raw_ids(to_remove.iter().copied()))
            .execute(&mut *tx)
            .await?;
        }

        if !to_add.is_empty() {
            sqlx::query(
                "INSERT INTO role_permissions (role_id, permission_id, is_granted, granted_by)
                 SELECT $1, UNNEST($2::bigint[]), TRUE, $3
                 ON CONFLICT (role_id, permission_id)
                 DO UPDATE SET is_granted = TRUE,
                               granted_at = NOW(),
                               granted_by = EXCLUDED.granted_by",
            )
            .bind(role_id)
            .bind(raw_ids(to_add.iter().copied()))
            .bind(granted_by)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, "Role or permission no longer exists"))?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn user_role_assignments(&self, user_id: UserId) -> StoreResult<Vec<UserRoleAssignment>> {
        let rows = sqlx::query_as::<_, UserRoleAssignment>(
            "SELECT * FROM user_roles WHERE user_id = $1 ORDER BY role_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn user_roles(&self, user_id: UserId) -> StoreResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT r.* FROM roles r
             JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY r.level, r.code",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn insert_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        assigned_by: Option<UserId>,
    ) -> StoreResult<Option<UserRoleAssignment>> {
        let row = sqlx::query_as::<_, UserRoleAssignment>(
            "INSERT INTO user_roles (user_id, role_id, assigned_by)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, role_id) DO NOTHING
             RETURNING *",
        )
        .bind(user_id)
        .bind(role_id)
        .bind(assigned_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Role no longer exists"))?;
        Ok(row)
    }

    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_user_role_diff(
        &self,
        user_id: UserId,
        to_add: &[RoleId],
        to_remove: &[RoleId],
        assigned_by: Option<UserId>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        if !to_remove.is_empty() {
            sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = ANY($2)")
                .bind(user_id)
                .bind(raw_ids(to_remove.iter().copied()))
                .execute(&mut *tx)
                .await?;
        }

        if !to_add.is_empty() {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id, assigned_by)
                 SELECT $1, UNNEST($2::bigint[]), $3
                 ON CONFLICT (user_id, role_id) DO NOTHING",
            )
            .bind(user_id)
            .bind(raw_ids(to_add.iter().copied()))
            .bind(assigned_by)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, "Role no longer exists"))?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn user_permissions(&self, user_id: UserId) -> StoreResult<Vec<UserPermission>> {
        let rows = sqlx::query_as::<_, UserPermission>(
            "SELECT * FROM user_permissions WHERE user_id = $1 ORDER BY permission_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> StoreResult<Option<UserPermission>> {
        let row = sqlx::query_as::<_, UserPermission>(
            "SELECT * FROM user_permissions WHERE user_id = $1 AND permission_id = $2",
        )
        .bind(user_id)
        .bind(permission_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn upsert_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        is_granted: bool,
        granted_by: Option<UserId>,
    ) -> StoreResult<UserPermission> {
        sqlx::query_as::<_, UserPermission>(
            "INSERT INTO user_permissions (user_id, permission_id, is_granted, granted_by)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, permission_id)
             DO UPDATE SET is_granted = EXCLUDED.is_granted,
                           granted_at = NOW(),
                           granted_by = EXCLUDED.granted_by
             RETURNING *",
        )
        .bind(user_id)
        .bind(permission_id)
        .bind(is_granted)
        .bind(granted_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Permission no longer exists"))
    }

    async fn delete_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM user_permissions WHERE user_id = $1 AND permission_id = $2")
                .bind(user_id)
                .bind(permission_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn role_granted_permission_ids(&self, user_id: UserId) -> StoreResult<Vec<PermissionId>> {
        let ids = sqlx::query_scalar::<_, PermissionId>(
            "SELECT DISTINCT rp.permission_id
             FROM role_permissions rp
             JOIN user_roles ur ON ur.role_id = rp.role_id
             JOIN roles r ON r.id = rp.role_id
             WHERE ur.user_id = $1 AND rp.is_granted AND r.is_active
             ORDER BY rp.permission_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn user_has_role_grant(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> StoreResult<bool> {
        let granted = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1
                FROM role_permissions rp
                JOIN user_roles ur ON ur.role_id = rp.role_id
                JOIN roles r ON r.id = rp.role_id
                WHERE ur.user_id = $1 AND rp.permission_id = $2
                  AND rp.is_granted AND r.is_active
             )",
        )
        .bind(user_id)
        .bind(permission_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(granted)
    }
}
