//! Menu and action catalog writes.
//!
//! Attaching an action to a menu materializes the matching
//! `menu.<menu_code>.<action_code>` permission so it can be granted at once.

use anyhow::anyhow;
use menuward_core::AppError;
use menuward_db::AuthzStore;
use menuward_models::{
    Action, ActionId, ActionTranslation, CreateActionDto, CreateMenuDto, Menu, MenuAction,
    MenuActionPair, MenuId, MenuTranslation, NewAction, NewMenu, NewPermission, Permission,
    TranslationDto,
};
use serde::Serialize;
use tracing::{info, instrument};
use validator::Validate;

use crate::validator::format_errors;

#[derive(Debug, Clone, Serialize)]
pub struct AttachedAction {
    #[serde(flatten)]
    pub menu_action: MenuAction,
    pub permission: Permission,
}

fn validate<T: Validate>(dto: &T) -> Result<(), AppError> {
    dto.validate()
        .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))
}

async fn require_menu(store: &dyn AuthzStore, id: MenuId) -> Result<Menu, AppError> {
    if !id.is_set() {
        return Err(AppError::bad_request(anyhow!("Menu id is required")));
    }
    store
        .find_menu(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Menu not found")))
}

async fn require_action(store: &dyn AuthzStore, id: ActionId) -> Result<Action, AppError> {
    if !id.is_set() {
        return Err(AppError::bad_request(anyhow!("Action id is required")));
    }
    store
        .find_action(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Action not found")))
}

fn permission_for(pair: &MenuActionPair) -> NewPermission {
    let label = pair.display_name.as_deref().unwrap_or(&pair.action_name);
    NewPermission::for_menu_action(
        pair.menu_id.into_inner(),
        &pair.menu_code,
        pair.action_id,
        &pair.action_code,
        Some(format!("{} {}", label, pair.menu_name)),
    )
}

#[instrument(skip(store))]
pub async fn create_menu(store: &dyn AuthzStore, dto: CreateMenuDto) -> Result<Menu, AppError> {
    validate(&dto)?;
    if let Some(parent_id) = dto.parent_id {
        require_menu(store, parent_id).await?;
    }

    let menu = store.insert_menu(&NewMenu::from(dto)).await?;
    info!(menu_id = %menu.id, code = %menu.code, "Menu created");
    Ok(menu)
}

#[instrument(skip(store))]
pub async fn create_action(
    store: &dyn AuthzStore,
    dto: CreateActionDto,
) -> Result<Action, AppError> {
    validate(&dto)?;
    store
        .insert_action(&NewAction {
            code: dto.code,
            name: dto.name,
            category: dto.category,
        })
        .await
}

#[instrument(skip(store))]
pub async fn attach_action_to_menu(
    store: &dyn AuthzStore,
    menu_id: MenuId,
    action_id: ActionId,
    display_name: Option<&str>,
) -> Result<AttachedAction, AppError> {
    let menu = require_menu(store, menu_id).await?;
    let action = require_action(store, action_id).await?;

    let menu_action = store.attach_action(menu.id, action.id, display_name).await?;
    let pair = MenuActionPair {
        menu_id: menu.id,
        menu_code: menu.code,
        menu_name: menu.name,
        action_id: action.id,
        action_code: action.code,
        action_name: action.name,
        display_name: menu_action.display_name.clone(),
    };
    let permission = store.upsert_permission(&permission_for(&pair)).await?;

    Ok(AttachedAction {
        menu_action,
        permission,
    })
}

/// One permission per attached menu/action pair, creating any that are
/// missing. Ordered by menu code then action code.
#[instrument(skip(store))]
pub async fn list_menu_permissions(store: &dyn AuthzStore) -> Result<Vec<Permission>, AppError> {
    let pairs = store.menu_action_pairs().await?;
    let mut permissions = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        permissions.push(store.upsert_permission(&permission_for(pair)).await?);
    }
    Ok(permissions)
}

#[instrument(skip(store))]
pub async fn set_menu_translation(
    store: &dyn AuthzStore,
    menu_id: MenuId,
    dto: TranslationDto,
) -> Result<MenuTranslation, AppError> {
    validate(&dto)?;
    require_menu(store, menu_id).await?;
    store
        .upsert_menu_translation(&MenuTranslation {
            menu_id,
            locale: dto.locale,
            name: dto.name,
            description: dto.description,
        })
        .await
}

#[instrument(skip(store))]
pub async fn set_action_translation(
    store: &dyn AuthzStore,
    action_id: ActionId,
    dto: TranslationDto,
) -> Result<ActionTranslation, AppError> {
    validate(&dto)?;
    require_action(store, action_id).await?;
    store
        .upsert_action_translation(&ActionTranslation {
            action_id,
            locale: dto.locale,
            name: dto.name,
            description: dto.description,
        })
        .await
}
