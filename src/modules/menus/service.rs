use std::collections::{BTreeMap, BTreeSet, HashMap};

use menuward_core::AppError;
use menuward_db::AuthzStore;
use menuward_models::{
    Action, ActionId, MenuActionNode, MenuId, MenuSummary, MenuTreeNode, PermissionId, UserId,
};
use tracing::{instrument, warn};

use super::tree::{build_tree, flatten};
use crate::modules::permissions::service::effective_permission_ids;

/// Held menu permissions grouped into menu id -> action ids.
async fn held_menu_actions(
    store: &dyn AuthzStore,
    user_id: UserId,
) -> Result<BTreeMap<MenuId, BTreeSet<ActionId>>, AppError> {
    let ids: Vec<PermissionId> = effective_permission_ids(store, user_id)
        .await?
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }

    let mut by_menu: BTreeMap<MenuId, BTreeSet<ActionId>> = BTreeMap::new();
    for permission in store.permissions_by_ids(&ids).await? {
        if permission.is_menu() {
            by_menu
                .entry(MenuId::new(permission.resource_id))
                .or_default()
                .insert(permission.action_id);
        }
    }
    Ok(by_menu)
}

async fn build_user_tree(
    store: &dyn AuthzStore,
    user_id: UserId,
    locale: Option<&str>,
) -> Result<Vec<MenuTreeNode>, AppError> {
    let by_menu = held_menu_actions(store, user_id).await?;
    if by_menu.is_empty() {
        return Ok(Vec::new());
    }

    let menu_ids: Vec<MenuId> = by_menu.keys().copied().collect();
    let menus: Vec<_> = store
        .menus_by_ids(&menu_ids)
        .await?
        .into_iter()
        .filter(|m| m.is_active)
        .collect();

    let action_ids: Vec<ActionId> = by_menu
        .values()
        .flatten()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let actions: HashMap<ActionId, Action> = store
        .actions_by_ids(&action_ids)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    let display_names: HashMap<(MenuId, ActionId), String> = store
        .menu_actions_for(&menu_ids)
        .await?
        .into_iter()
        .filter_map(|ma| {
            let key = (ma.menu_id, ma.action_id);
            ma.display_name.map(|name| (key, name))
        })
        .collect();

    let (menu_names, action_names) = match locale {
        Some(locale) => {
            let menu_names: HashMap<MenuId, String> = store
                .menu_translations(&menu_ids, locale)
                .await?
                .into_iter()
                .map(|t| (t.menu_id, t.name))
                .collect();
            let action_names: HashMap<ActionId, String> = store
                .action_translations(&action_ids, locale)
                .await?
                .into_iter()
                .map(|t| (t.action_id, t.name))
                .collect();
            (menu_names, action_names)
        }
        None => (HashMap::new(), HashMap::new()),
    };

    let nodes = menus
        .into_iter()
        .map(|menu| {
            let mut menu_actions: Vec<MenuActionNode> = by_menu
                .get(&menu.id)
                .into_iter()
                .flatten()
                .filter_map(|action_id| actions.get(action_id))
                .map(|action| {
                    let name = action_names
                        .get(&action.id)
                        .or_else(|| display_names.get(&(menu.id, action.id)))
                        .unwrap_or(&action.name)
                        .clone();
                    MenuActionNode {
                        id: action.id,
                        code: action.code.clone(),
                        name,
                        has_permission: true,
                    }
                })
                .collect();
            menu_actions.sort_by(|a, b| a.code.cmp(&b.code));

            MenuTreeNode {
                id: menu.id,
                name: menu_names.get(&menu.id).cloned().unwrap_or(menu.name),
                code: menu.code,
                path: menu.path,
                icon: menu.icon,
                sort_order: menu.sort_order,
                parent_id: menu.parent_id,
                actions: menu_actions,
                children: Vec::new(),
            }
        })
        .collect();

    Ok(build_tree(nodes))
}

/// The navigation forest of active menus the user holds at least one action on.
#[instrument(skip(store))]
pub async fn get_user_menu_tree(
    store: &dyn AuthzStore,
    user_id: UserId,
    locale: Option<&str>,
) -> Vec<MenuTreeNode> {
    if !user_id.is_set() {
        return Vec::new();
    }

    match build_user_tree(store, user_id, locale).await {
        Ok(tree) => tree,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to build menu tree");
            Vec::new()
        }
    }
}

/// The same menus as [`get_user_menu_tree`], flattened in tree order.
#[instrument(skip(store))]
pub async fn get_user_menus_simple(
    store: &dyn AuthzStore,
    user_id: UserId,
    locale: Option<&str>,
) -> Vec<MenuSummary> {
    flatten(&get_user_menu_tree(store, user_id, locale).await)
}
