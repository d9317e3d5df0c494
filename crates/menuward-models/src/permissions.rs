//! Permission models.
//!
//! A permission is the canonical join point between a protected resource and
//! an operation on it. Its `code` is unique and stable once created, and
//! `(resource_type, resource_id, action_id)` determines it.

use crate::ids::{ActionId, PermissionId};
use chrono::{DateTime, Utc};
use menuward_core::permissions::{PermissionCode, ResourceType};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: PermissionId,
    pub code: String,
    pub resource_type: String,
    /// Id of the protected resource, e.g. a menu id.
    pub resource_id: i64,
    pub action_id: ActionId,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Permission {
    pub fn is_menu(&self) -> bool {
        self.resource_type == ResourceType::Menu.as_str()
    }
}

/// Upsert shape for a permission, keyed by `code`.
#[derive(Debug, Clone)]
pub struct NewPermission {
    pub code: String,
    pub resource_type: ResourceType,
    pub resource_id: i64,
    pub action_id: ActionId,
    pub description: Option<String>,
}

impl NewPermission {
    /// Permission for performing `action_code` on the menu `menu_code`.
    pub fn for_menu_action(
        menu_id: i64,
        menu_code: &str,
        action_id: ActionId,
        action_code: &str,
        description: Option<String>,
    ) -> Self {
        Self {
            code: PermissionCode::menu(menu_code, action_code).to_string(),
            resource_type: ResourceType::Menu,
            resource_id: menu_id,
            action_id,
            description,
        }
    }
}
