//! Role, grant and assignment models and DTOs.
//!
//! Role-level grants are two-state (a `RolePermission` row exists or it does
//! not), while user-level overrides are three-state, see [`PermissionState`].

use crate::ids::{PermissionId, RoleId, UserId};
use crate::permissions::Permission;
use chrono::{DateTime, Utc};
use menuward_core::PaginationParams;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Level assigned to roles created without one (lowest privilege).
pub const DEFAULT_ROLE_LEVEL: i32 = 99;

/// Role codes are lowercase ASCII letters and underscores only.
pub fn is_valid_role_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

fn validate_role_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_role_code(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("role_code");
        err.message = Some("Code must match ^[a-z_]+$".into());
        Err(err)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: RoleId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Lower value = higher privilege.
    pub level: i32,
    pub is_active: bool,
    /// System roles cannot be updated or deleted.
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

/// Picks the most privileged role (lowest level, then lowest id).
pub fn most_privileged<'a, I>(roles: I) -> Option<&'a Role>
where
    I: IntoIterator<Item = &'a Role>,
{
    roles.into_iter().min_by_key(|r| (r.level, r.id))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RolePermission {
    pub role_id: RoleId,
    pub permission_id: PermissionId,
    pub is_granted: bool,
    pub granted_at: DateTime<Utc>,
    pub granted_by: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserRoleAssignment {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: Option<UserId>,
}

/// A user's direct opinion on one permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    /// No `UserPermission` row.
    Unset,
    /// `is_granted = true`.
    Grant,
    /// `is_granted = false`; beats every grant for the pair.
    Deny,
}

impl PermissionState {
    pub fn from_row(is_granted: Option<bool>) -> Self {
        match is_granted {
            None => Self::Unset,
            Some(true) => Self::Grant,
            Some(false) => Self::Deny,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserPermission {
    pub user_id: UserId,
    pub permission_id: PermissionId,
    pub is_granted: bool,
    pub granted_at: DateTime<Utc>,
    pub granted_by: Option<UserId>,
}

impl UserPermission {
    pub fn state(&self) -> PermissionState {
        PermissionState::from_row(Some(self.is_granted))
    }
}

/// A user override joined with its permission code, for admin display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionOverride {
    pub permission_id: PermissionId,
    pub code: String,
    pub state: PermissionState,
    pub granted_at: DateTime<Utc>,
    pub granted_by: Option<UserId>,
}

/// Insert shape for a role.
#[derive(Debug, Clone)]
pub struct NewRole {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub level: i32,
    pub is_active: bool,
    pub is_system: bool,
    pub created_by: Option<UserId>,
}

/// Fields an update may change; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct RoleChanges {
    pub name: Option<String>,
    /// `Some("")` clears the description.
    pub description: Option<String>,
    pub level: Option<i32>,
    pub is_active: Option<bool>,
}

/// Store-side role list filter.
#[derive(Debug, Clone, Default)]
pub struct RoleFilter {
    pub is_system: Option<bool>,
    pub is_active: Option<bool>,
}

/// Which ids a reconciliation added and removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome<Id> {
    pub added: Vec<Id>,
    pub removed: Vec<Id>,
}

impl<Id> SyncOutcome<Id> {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoleDto {
    #[validate(
        length(
            min = 1,
            max = 50,
            message = "Code must be between 1 and 50 characters"
        ),
        custom(function = "validate_role_code")
    )]
    pub code: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Level must be a positive integer"))]
    pub level: Option<i32>,
    /// Permissions granted atomically with creation.
    pub permission_ids: Option<Vec<PermissionId>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRoleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Level must be a positive integer"))]
    pub level: Option<i32>,
    pub is_active: Option<bool>,
}

impl From<UpdateRoleDto> for RoleChanges {
    fn from(dto: UpdateRoleDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            level: dto.level,
            is_active: dto.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleToUserDto {
    pub role_id: RoleId,
}

#[derive(Debug, Deserialize)]
pub struct SyncUserRolesDto {
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Deserialize)]
pub struct GrantPermissionDto {
    pub permission_id: PermissionId,
}

#[derive(Debug, Deserialize)]
pub struct SyncRolePermissionsDto {
    pub permission_ids: Vec<PermissionId>,
}

#[derive(Debug, Deserialize)]
pub struct RoleFilterParams {
    pub is_system: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize)]
pub struct PaginatedRolesResponse {
    pub data: Vec<Role>,
    pub meta: menuward_core::PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct RoleAssignmentResponse {
    pub message: String,
    pub user_id: UserId,
    pub role_id: RoleId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn role(id: i64, level: i32) -> Role {
        Role {
            id: RoleId::new(id),
            code: format!("role_{}", id),
            name: format!("Role {}", id),
            description: None,
            level,
            is_active: true,
            is_system: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: None,
        }
    }

    #[test]
    fn test_role_code_format() {
        assert!(is_valid_role_code("super_admin"));
        assert!(is_valid_role_code("editor"));
        assert!(!is_valid_role_code(""));
        assert!(!is_valid_role_code("Editor"));
        assert!(!is_valid_role_code("editor2"));
        assert!(!is_valid_role_code("post-editor"));
    }

    #[test]
    fn test_most_privileged_uses_min_level() {
        let roles = vec![role(1, 50), role(2, 1), role(3, 10)];
        assert_eq!(most_privileged(&roles).map(|r| r.id), Some(RoleId::new(2)));
        assert!(most_privileged(&Vec::<Role>::new()).is_none());
    }

    #[test]
    fn test_permission_state_from_row() {
        assert_eq!(PermissionState::from_row(None), PermissionState::Unset);
        assert_eq!(
            PermissionState::from_row(Some(true)),
            PermissionState::Grant
        );
        assert_eq!(
            PermissionState::from_row(Some(false)),
            PermissionState::Deny
        );
    }

    #[test]
    fn test_create_role_dto_validation() {
        let valid = CreateRoleDto {
            code: "editor".to_string(),
            name: "Editor".to_string(),
            description: Some("Edits posts".to_string()),
            level: Some(20),
            permission_ids: None,
        };
        assert!(valid.validate().is_ok());

        let bad_code = CreateRoleDto {
            code: "Editor-1".to_string(),
            ..valid.clone()
        };
        assert!(bad_code.validate().is_err());

        let bad_level = CreateRoleDto {
            level: Some(0),
            ..valid
        };
        assert!(bad_level.validate().is_err());
    }

    #[test]
    fn test_update_role_dto_validation() {
        let long_description = UpdateRoleDto {
            description: Some("x".repeat(501)),
            ..Default::default()
        };
        assert!(long_description.validate().is_err());
        assert!(UpdateRoleDto::default().validate().is_ok());
    }

    #[test]
    fn test_sync_outcome_noop() {
        let outcome: SyncOutcome<RoleId> = SyncOutcome {
            added: vec![],
            removed: vec![],
        };
        assert!(outcome.is_noop());
    }
}
