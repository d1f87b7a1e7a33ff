//! Location admin

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Location, LocationCreate, LocationUpdate};

use crate::api::{ApiResult, contains_ci, search_term};
use crate::maps::MapError;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_URL_LEN, validate_coordinates, validate_optional_text,
    validate_required_text,
};

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api/admin/locations",
        Router::new()
            .route("/", get(list).post(create))
            .route("/{id}", get(get_by_id).put(update).delete(delete)),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

/// GET /api/admin/locations - by name, optional name/address search
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Location>> {
    let mut locations = state.store.list_locations().await?;
    if let Some(q) = search_term(params.q.as_deref()) {
        locations.retain(|l| contains_ci(&l.name, &q) || contains_ci(&l.address, &q));
    }
    Ok(Json(locations))
}

/// GET /api/admin/locations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Location> {
    Ok(Json(state.store.get_location(&id).await?))
}

/// POST /api/admin/locations - geocodes the address when lat/lng are omitted
pub async fn create(
    State(state): State<AppState>,
    Json(mut payload): Json<LocationCreate>,
) -> ApiResult<Location> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;

    if payload.lat.is_none() || payload.lng.is_none() {
        let point = match state.maps.geocode(&payload.address).await {
            Ok(point) => point,
            Err(MapError::NotConfigured) => {
                return Err(AppError::new(ErrorCode::LocationMissingCoordinates).into());
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(address = %payload.address, lat = point.lat, lng = point.lng, "Geocoded location");
        payload.lat = Some(point.lat);
        payload.lng = Some(point.lng);
    }
    if let (Some(lat), Some(lng)) = (payload.lat, payload.lng) {
        validate_coordinates(lat, lng)?;
    }

    let location = state.store.create_location(&payload).await?;
    tracing::info!(id = %location.id, name = %location.name, "Location created");
    Ok(Json(location))
}

/// PUT /api/admin/locations/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<LocationUpdate>,
) -> ApiResult<Location> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(address) = &payload.address {
        validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
    }
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    let current = state.store.get_location(&id).await?;
    validate_coordinates(
        payload.lat.unwrap_or(current.lat),
        payload.lng.unwrap_or(current.lng),
    )?;

    Ok(Json(state.store.update_location(&id, &payload).await?))
}

/// DELETE /api/admin/locations/{id} - also removes its schedule rows
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<bool> {
    state.store.delete_location(&id).await?;
    tracing::info!(id = %id, "Location deleted");
    Ok(Json(true))
}
