//! HTTP routes
//!
//! - [`health`] - liveness
//! - [`public`] - what the site reads, plus order placement and reviews
//! - [`admin`] - console CRUD and the dashboard
//! - [`functions`] - the confirmation-email function

pub mod admin;
pub mod functions;
pub mod health;
pub mod public;

use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Lowercased, trimmed search term; `None` when blank
pub(crate) fn search_term(q: Option<&str>) -> Option<String> {
    q.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub fn create_router(state: AppState) -> Router {
    let functions = Router::new().route(
        "/functions/send-order-email",
        post(functions::send_order_email),
    );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public::router())
        .merge(admin::router())
        .merge(functions)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term() {
        assert_eq!(search_term(Some("  Jerk ")), Some("jerk".into()));
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(None), None);
        assert!(contains_ci("Jerk Chicken", "chicken"));
    }
}
