//! Admin console API
//!
//! One module per table. Lists accept a `q` search term applied in the
//! handler after the store's own filters.

pub mod blog;
pub mod dashboard;
pub mod locations;
pub mod menu;
pub mod orders;
pub mod schedules;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(locations::router())
        .merge(menu::router())
        .merge(schedules::router())
        .merge(blog::router())
        .merge(orders::router())
        .merge(dashboard::router())
}
