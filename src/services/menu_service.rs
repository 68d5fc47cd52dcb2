use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::menu_items::{MenuItemList, MenuItemRequest, ValidMenuItem},
    entity::menu_items::{ActiveModel, Column, Entity as MenuItems, Model as MenuItemModel},
    error::{AppError, AppResult},
    models::MenuItem,
    response::{ApiResponse, Meta},
    state::AppState,
};

const NAME_TAKEN: &str = "menu item with this name already exists.";

pub async fn list_menu_items(state: &AppState) -> AppResult<ApiResponse<MenuItemList>> {
    let items: Vec<MenuItem> = MenuItems::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(menu_item_from_entity)
        .collect();

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Menu items", MenuItemList { items }, Some(meta)))
}

pub async fn get_menu_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuItem>> {
    let item = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(menu_item_from_entity);
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Menu item", item, Some(Meta::empty())))
}

pub async fn create_menu_item(
    state: &AppState,
    payload: MenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let payload = payload.validate()?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        price: Set(payload.price),
        is_available: Set(payload.is_available),
        preparation_time: Set(payload.preparation_time),
        options: Set(serde_json::json!(payload.options)),
        created_at: Set(Utc::now().into()),
    };
    let item = active
        .insert(&state.orm)
        .await
        .map_err(|e| AppError::on_unique(e, "name", NAME_TAKEN))?;

    tracing::info!(menu_item_id = %item.id, name = %item.name, "menu item created");

    Ok(ApiResponse::success(
        "Menu item created",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

/// Full replacement; every field is validated as on create.
pub async fn update_menu_item(
    state: &AppState,
    id: Uuid,
    payload: MenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let existing = MenuItems::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let ValidMenuItem {
        name,
        price,
        is_available,
        preparation_time,
        options,
    } = payload.validate()?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    active.price = Set(price);
    active.is_available = Set(is_available);
    active.preparation_time = Set(preparation_time);
    active.options = Set(serde_json::json!(options));
    let item = active
        .update(&state.orm)
        .await
        .map_err(|e| AppError::on_unique(e, "name", NAME_TAKEN))?;

    tracing::info!(menu_item_id = %item.id, "menu item updated");

    Ok(ApiResponse::success(
        "Updated",
        menu_item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub(crate) fn menu_item_from_entity(model: MenuItemModel) -> MenuItem {
    MenuItem {
        id: model.id,
        name: model.name,
        price: model.price,
        is_available: model.is_available,
        preparation_time: model.preparation_time,
        options: serde_json::from_value(model.options).unwrap_or_default(),
    }
}
