//! Permission codes.
//!
//! A permission code is the stable, bit-exact string
//! `<resource_type>.<resource_target>.<action_code>`, e.g. `menu.users.create`.
//! The resource target may itself contain dots; the resource type is everything
//! before the first dot and the action is everything after the last one.
//!
//! # Example
//!
//! ```ignore
//! use menuward_core::permissions::{self, PermissionCode, ResourceType};
//!
//! let code = PermissionCode::menu("posts", "publish");
//! assert_eq!(code.to_string(), "menu.posts.publish");
//!
//! let parsed: PermissionCode = permissions::ROLES_MANAGE.parse()?;
//! assert_eq!(parsed.resource_type(), ResourceType::Menu);
//! ```

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Kind of resource a permission protects.
///
/// Only [`ResourceType::Menu`] is exercised by the engine today; the others
/// are reserved so codes for them parse and round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Menu,
    Api,
    Feature,
    Report,
    Data,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Api => "api",
            Self::Feature => "feature",
            Self::Report => "report",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "menu" => Ok(Self::Menu),
            "api" => Ok(Self::Api),
            "feature" => Ok(Self::Feature),
            "report" => Ok(Self::Report),
            "data" => Ok(Self::Data),
            other => Err(AppError::bad_request(anyhow!("Unknown resource type: {}", other))),
        }
    }
}

/// A parsed permission code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionCode {
    resource_type: ResourceType,
    target: String,
    action: String,
}

impl PermissionCode {
    pub fn new(
        resource_type: ResourceType,
        target: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            resource_type,
            target: target.into(),
            action: action.into(),
        }
    }

    /// Code for an action on a menu, keyed by the menu's code.
    pub fn menu(menu_code: impl Into<String>, action_code: impl Into<String>) -> Self {
        Self::new(ResourceType::Menu, menu_code, action_code)
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn action(&self) -> &str {
        &self.action
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.resource_type, self.target, self.action)
    }
}

impl FromStr for PermissionCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::bad_request(anyhow!("Invalid permission code: {}", s));

        let (resource_type, rest) = s.split_once('.').ok_or_else(invalid)?;
        let (target, action) = rest.rsplit_once('.').ok_or_else(invalid)?;
        if target.is_empty() || action.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            resource_type: resource_type.parse()?,
            target: target.to_string(),
            action: action.to_string(),
        })
    }
}

// =============================================================================
// Admin console permissions
// =============================================================================

/// Permission to read roles and their grants
pub const ROLES_VIEW: &str = "menu.roles.view";
/// Permission to create, update, delete roles and manage their grants
pub const ROLES_MANAGE: &str = "menu.roles.update";
/// Permission to assign roles and per-user overrides
pub const USERS_ASSIGN: &str = "menu.users.assign";
/// Permission to manage the menu and action catalog
pub const MENUS_MANAGE: &str = "menu.menus.update";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_code_formats_bit_exact() {
        assert_eq!(
            PermissionCode::menu("users", "create").to_string(),
            "menu.users.create"
        );
    }

    #[test]
    fn test_parse_splits_on_first_and_last_dot() {
        let code: PermissionCode = "menu.reports.sales.export".parse().unwrap();
        assert_eq!(code.resource_type(), ResourceType::Menu);
        assert_eq!(code.target(), "reports.sales");
        assert_eq!(code.action(), "export");
    }

    #[test]
    fn test_parse_reserved_resource_types() {
        let code: PermissionCode = "report.monthly.view".parse().unwrap();
        assert_eq!(code.resource_type(), ResourceType::Report);
        assert_eq!(code.to_string(), "report.monthly.view");
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        for bad in [
            "",
            "menu",
            "menu.users",
            "menu..create",
            "menu.users.",
            "widget.x.view",
        ] {
            assert!(
                bad.parse::<PermissionCode>().is_err(),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_console_constants_parse() {
        for code in [ROLES_VIEW, ROLES_MANAGE, USERS_ASSIGN, MENUS_MANAGE] {
            let parsed: PermissionCode = code.parse().unwrap();
            assert_eq!(parsed.to_string(), code);
        }
    }
}
