//! Menu, action and navigation tree models.

use crate::ids::{ActionId, MenuId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// An operation that can exist on a menu ("view", "create", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Action {
    pub id: ActionId,
    pub code: String,
    pub name: String,
    /// Classification label only.
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Menu {
    pub id: MenuId,
    pub code: String,
    pub name: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    /// `None` means root.
    pub parent_id: Option<MenuId>,
    pub sort_order: i32,
    pub is_active: bool,
    pub description: Option<String>,
    pub badge: Option<String>,
    pub tooltip: Option<String>,
    pub is_external: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An operation that exists on a menu, independent of who may perform it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MenuAction {
    pub menu_id: MenuId,
    pub action_id: ActionId,
    /// Replaces the action name when displayed on this menu.
    pub display_name: Option<String>,
}

/// A [`MenuAction`] joined with both codes.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MenuActionPair {
    pub menu_id: MenuId,
    pub menu_code: String,
    pub menu_name: String,
    pub action_id: ActionId,
    pub action_code: String,
    pub action_name: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MenuTranslation {
    pub menu_id: MenuId,
    pub locale: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ActionTranslation {
    pub action_id: ActionId,
    pub locale: String,
    pub name: String,
    pub description: Option<String>,
}

/// Insert shape for a menu.
#[derive(Debug, Clone, Default)]
pub struct NewMenu {
    pub code: String,
    pub name: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<MenuId>,
    pub sort_order: i32,
    pub is_active: bool,
    pub description: Option<String>,
    pub badge: Option<String>,
    pub tooltip: Option<String>,
    pub is_external: bool,
}

/// Insert shape for an action.
#[derive(Debug, Clone)]
pub struct NewAction {
    pub code: String,
    pub name: String,
    pub category: Option<String>,
}

/// An action on a menu node; always one the user holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuActionNode {
    pub id: ActionId,
    pub code: String,
    pub name: String,
    #[serde(rename = "hasPermission")]
    pub has_permission: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTreeNode {
    pub id: MenuId,
    pub code: String,
    pub name: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub parent_id: Option<MenuId>,
    pub actions: Vec<MenuActionNode>,
    pub children: Vec<MenuTreeNode>,
}

/// Flat navigation entry without actions or children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSummary {
    pub id: MenuId,
    pub code: String,
    pub name: String,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub parent_id: Option<MenuId>,
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMenuDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Code must be between 1 and 100 characters"
    ))]
    pub code: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(max = 255, message = "Path must not exceed 255 characters"))]
    pub path: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<MenuId>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
    pub badge: Option<String>,
    pub tooltip: Option<String>,
    pub is_external: Option<bool>,
}

impl From<CreateMenuDto> for NewMenu {
    fn from(dto: CreateMenuDto) -> Self {
        Self {
            code: dto.code,
            name: dto.name,
            path: dto.path,
            icon: dto.icon,
            parent_id: dto.parent_id,
            sort_order: dto.sort_order.unwrap_or(0),
            is_active: dto.is_active.unwrap_or(true),
            description: dto.description,
            badge: dto.badge,
            tooltip: dto.tooltip,
            is_external: dto.is_external.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateActionDto {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Code must be between 1 and 50 characters"
    ))]
    pub code: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachActionDto {
    pub action_id: ActionId,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TranslationDto {
    #[validate(length(
        min = 2,
        max = 16,
        message = "Locale must be between 2 and 16 characters"
    ))]
    pub locale: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    pub description: Option<String>,
}

/// `?locale=` query for menu endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

impl LocaleQuery {
    /// The locale, with blank values treated as absent.
    pub fn locale(&self) -> Option<&str> {
        self.locale
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_node_serializes_has_permission_in_camel_case() {
        let node = MenuActionNode {
            id: ActionId::new(1),
            code: "view".to_string(),
            name: "View".to_string(),
            has_permission: true,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["hasPermission"], true);
        assert!(json.get("has_permission").is_none());
    }

    #[test]
    fn test_tree_node_keys() {
        let node = MenuTreeNode {
            id: MenuId::new(4),
            code: "posts".to_string(),
            name: "Posts".to_string(),
            path: Some("/posts".to_string()),
            icon: None,
            sort_order: 2,
            parent_id: Some(MenuId::new(1)),
            actions: vec![],
            children: vec![],
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["sort_order"], 2);
        assert_eq!(json["parent_id"], 1);
        assert!(json["children"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_create_menu_dto_defaults() {
        let dto = CreateMenuDto {
            code: "posts".to_string(),
            name: "Posts".to_string(),
            path: None,
            icon: None,
            parent_id: None,
            sort_order: None,
            is_active: None,
            description: None,
            badge: None,
            tooltip: None,
            is_external: None,
        };
        assert!(dto.validate().is_ok());
        let menu = NewMenu::from(dto);
        assert!(menu.is_active);
        assert_eq!(menu.sort_order, 0);
        assert!(!menu.is_external);
    }

    #[test]
    fn test_locale_query_blank_is_none() {
        let q = LocaleQuery {
            locale: Some("  ".to_string()),
        };
        assert_eq!(q.locale(), None);
        let q = LocaleQuery {
            locale: Some("fr".to_string()),
        };
        assert_eq!(q.locale(), Some("fr"));
    }
}
