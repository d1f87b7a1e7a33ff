//! Dashboard endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use shared::util::now;

use crate::api::ApiResult;
use crate::dashboard::{Dashboard, load_dashboard};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/dashboard", get(get_dashboard))
}

/// GET /api/admin/dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<Dashboard> {
    Ok(Json(load_dashboard(state.store.as_ref(), now()).await?))
}
