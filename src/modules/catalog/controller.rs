use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use menuward_core::AppError;
use menuward_models::{
    Action, ActionId, ActionTranslation, AttachActionDto, CreateActionDto, CreateMenuDto, Menu,
    MenuId, MenuTranslation, Permission, TranslationDto,
};

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::{self, AttachedAction};

pub async fn create_menu(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateMenuDto>,
) -> Result<(StatusCode, Json<Menu>), AppError> {
    let menu = service::create_menu(state.store(), dto).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

pub async fn create_action(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateActionDto>,
) -> Result<(StatusCode, Json<Action>), AppError> {
    let action = service::create_action(state.store(), dto).await?;
    Ok((StatusCode::CREATED, Json(action)))
}

pub async fn attach_action(
    State(state): State<AppState>,
    Path(menu_id): Path<MenuId>,
    Json(dto): Json<AttachActionDto>,
) -> Result<Json<AttachedAction>, AppError> {
    let attached = service::attach_action_to_menu(
        state.store(),
        menu_id,
        dto.action_id,
        dto.display_name.as_deref(),
    )
    .await?;
    Ok(Json(attached))
}

pub async fn list_menu_permissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Permission>>, AppError> {
    let permissions = service::list_menu_permissions(state.store()).await?;
    Ok(Json(permissions))
}

pub async fn set_menu_translation(
    State(state): State<AppState>,
    Path(menu_id): Path<MenuId>,
    ValidatedJson(dto): ValidatedJson<TranslationDto>,
) -> Result<Json<MenuTranslation>, AppError> {
    let translation = service::set_menu_translation(state.store(), menu_id, dto).await?;
    Ok(Json(translation))
}

pub async fn set_action_translation(
    State(state): State<AppState>,
    Path(action_id): Path<ActionId>,
    ValidatedJson(dto): ValidatedJson<TranslationDto>,
) -> Result<Json<ActionTranslation>, AppError> {
    let translation = service::set_action_translation(state.store(), action_id, dto).await?;
    Ok(Json(translation))
}
