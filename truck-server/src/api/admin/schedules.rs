//! Schedule admin

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::models::{Schedule, ScheduleCreate, ScheduleQuery, ScheduleUpdate, ScheduleWithLocation};

use crate::api::{ApiResult, contains_ci, search_term};
use crate::state::AppState;
use crate::utils::validation::validate_schedule_window;

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api/admin/schedules",
        Router::new()
            .route("/", get(list).post(create))
            .route("/{id}", get(get_by_id).put(update).delete(delete)),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Location name/address search
    pub q: Option<String>,
    pub date: Option<NaiveDate>,
    pub location_id: Option<String>,
}

/// GET /api/admin/schedules - every row with its location, by date
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<ScheduleWithLocation>> {
    let query = ScheduleQuery {
        date: params.date,
        location_id: params.location_id,
        ..Default::default()
    };
    let mut rows = state.store.list_schedules(&query).await?;
    if let Some(q) = search_term(params.q.as_deref()) {
        rows.retain(|s| {
            s.location
                .as_ref()
                .is_some_and(|l| contains_ci(&l.name, &q) || contains_ci(&l.address, &q))
        });
    }
    Ok(Json(rows))
}

/// GET /api/admin/schedules/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Schedule> {
    Ok(Json(state.store.get_schedule(&id).await?))
}

/// POST /api/admin/schedules
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ScheduleCreate>,
) -> ApiResult<Schedule> {
    validate_schedule_window(payload.start_time, payload.end_time)?;
    let schedule = state.store.create_schedule(&payload).await?;
    tracing::info!(
        id = %schedule.id,
        location_id = %schedule.location_id,
        date = %schedule.date,
        "Schedule created"
    );
    Ok(Json(schedule))
}

/// PUT /api/admin/schedules/{id} - the merged window must still open before it closes
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ScheduleUpdate>,
) -> ApiResult<Schedule> {
    if payload.start_time.is_some() || payload.end_time.is_some() {
        let current = state.store.get_schedule(&id).await?;
        validate_schedule_window(
            payload.start_time.unwrap_or(current.start_time),
            payload.end_time.unwrap_or(current.end_time),
        )?;
    }
    Ok(Json(state.store.update_schedule(&id, &payload).await?))
}

/// DELETE /api/admin/schedules/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<bool> {
    state.store.delete_schedule(&id).await?;
    Ok(Json(true))
}
