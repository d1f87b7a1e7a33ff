//! Menu admin

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};

use crate::api::public::parse_category;
use crate::api::{ApiResult, contains_ci, search_term};
use crate::catalog::MenuQuery;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_price,
    validate_required_text,
};

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api/admin/menu",
        Router::new()
            .route("/", get(list).post(create))
            .route("/{id}", get(get_by_id).put(update).delete(delete)),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub category: Option<String>,
}

/// GET /api/admin/menu - name/description search and category filter
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<MenuItem>> {
    let category = parse_category(params.category.as_deref())?;
    let mut items = state.store.list_menu_items(&MenuQuery { category }).await?;
    if let Some(q) = search_term(params.q.as_deref()) {
        items.retain(|m| {
            contains_ci(&m.name, &q)
                || m.description.as_deref().is_some_and(|d| contains_ci(d, &q))
        });
    }
    Ok(Json(items))
}

/// GET /api/admin/menu/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MenuItem> {
    Ok(Json(state.store.get_menu_item(&id).await?))
}

/// POST /api/admin/menu
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<MenuItemCreate>,
) -> ApiResult<MenuItem> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    validate_price(payload.price)?;

    let item = state.store.create_menu_item(&payload).await?;
    tracing::info!(id = %item.id, name = %item.name, "Menu item created");
    Ok(Json(item))
}

/// PUT /api/admin/menu/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;

    Ok(Json(state.store.update_menu_item(&id, &payload).await?))
}

/// DELETE /api/admin/menu/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<bool> {
    state.store.delete_menu_item(&id).await?;
    tracing::info!(id = %id, "Menu item deleted");
    Ok(Json(true))
}
