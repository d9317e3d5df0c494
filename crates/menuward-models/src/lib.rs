//! # Menuward Models
//!
//! Domain models and DTOs for the Menuward authorization engine.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed entity ids
//! - [`menus`]: Menus, actions, translations and the navigation tree
//! - [`permissions`]: The permission catalog
//! - [`roles`]: Roles, grants, assignments and user overrides
//!
//! # Example
//!
//! ```ignore
//! use menuward_models::{Role, most_privileged};
//!
//! let top = most_privileged(&roles).map(|r| r.code.as_str());
//! ```

pub mod ids;
pub mod menus;
pub mod permissions;
pub mod roles;

// Re-export commonly used types at crate root for convenience
pub use ids::{ActionId, MenuId, PermissionId, RoleId, UserId};

pub use menus::{
    Action, ActionTranslation, AttachActionDto, CreateActionDto, CreateMenuDto, LocaleQuery, Menu,
    MenuAction, MenuActionNode, MenuActionPair, MenuSummary, MenuTranslation, MenuTreeNode,
    NewAction, NewMenu, TranslationDto,
};

pub use permissions::{NewPermission, Permission};

pub use roles::{
    AssignRoleToUserDto, CreateRoleDto, DEFAULT_ROLE_LEVEL, GrantPermissionDto, NewRole,
    PaginatedRolesResponse, PermissionOverride, PermissionState, Role, RoleAssignmentResponse,
    RoleChanges, RoleFilter, RoleFilterParams, RolePermission, RoleWithPermissions, SyncOutcome,
    SyncRolePermissionsDto, SyncUserRolesDto, UpdateRoleDto, UserPermission, UserRoleAssignment,
    is_valid_role_code, most_privileged,
};
