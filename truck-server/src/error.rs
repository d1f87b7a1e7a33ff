//! Service-layer error
//!
//! `ServiceError` lets handlers `?` store, map, notifier and order errors and
//! still answer with the unified `AppError` response.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::catalog::StoreError;
use crate::maps::MapError;
use crate::notifier::NotifierError;
use crate::orders::OrderError;

#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    App(AppError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<OrderError> for ServiceError {
    fn from(e: OrderError) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<MapError> for ServiceError {
    fn from(e: MapError) -> Self {
        ServiceError::App(e.into())
    }
}

impl From<NotifierError> for ServiceError {
    fn from(e: NotifierError) -> Self {
        ServiceError::App(e.into())
    }
}

fn not_found_code(entity: &str) -> ErrorCode {
    match entity {
        "location" => ErrorCode::LocationNotFound,
        "menu item" => ErrorCode::MenuItemNotFound,
        "schedule" => ErrorCode::ScheduleNotFound,
        "order" => ErrorCode::OrderNotFound,
        "blog post" => ErrorCode::BlogPostNotFound,
        _ => ErrorCode::NotFound,
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, id } => AppError::new(not_found_code(entity))
                .with_detail("entity", entity)
                .with_detail("id", id),
            StoreError::Validation(msg) => AppError::validation(msg),
            StoreError::Database(msg) => {
                tracing::error!(error = %msg, "Store error");
                AppError::new(ErrorCode::DatabaseError)
            }
            StoreError::PartialOrder { order_id, reason } => {
                tracing::error!(order_id = %order_id, reason = %reason, "Partial order");
                AppError::new(ErrorCode::OrderPartiallyCreated).with_detail("order_id", order_id)
            }
            StoreError::Call(call) if call.is_timeout() => AppError::timeout(call.message),
            StoreError::Call(call) => AppError::with_message(ErrorCode::NetworkError, call.message),
        }
    }
}

impl From<MapError> for AppError {
    fn from(e: MapError) -> Self {
        match e {
            MapError::NotConfigured | MapError::Load(_) => {
                AppError::with_message(ErrorCode::MapUnavailable, e.to_string())
            }
            MapError::NoResult(_) => AppError::with_message(ErrorCode::GeocodeFailed, e.to_string()),
            MapError::Call(call) if call.is_timeout() => AppError::timeout(call.message),
            MapError::Call(call) => AppError::with_message(ErrorCode::NetworkError, call.message),
        }
    }
}

impl From<NotifierError> for AppError {
    fn from(e: NotifierError) -> Self {
        match &e {
            NotifierError::NotConfigured(msg) => AppError::with_message(ErrorCode::ConfigError, msg),
            NotifierError::InvalidOrder(msg) => AppError::validation(msg),
            _ => AppError::with_message(ErrorCode::NotifierFailed, e.user_message()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Store(store_err) => store_err.into(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::CallError;
    use http::StatusCode;

    #[test]
    fn test_store_not_found_codes() {
        let app: AppError = StoreError::not_found("menu item", "m1").into();
        assert_eq!(app.code, ErrorCode::MenuItemNotFound);
        assert_eq!(app.http_status(), StatusCode::NOT_FOUND);

        let app: AppError = StoreError::not_found("widget", "w1").into();
        assert_eq!(app.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_store_call_errors() {
        let app: AppError = StoreError::Call(CallError::timeout("slow")).into();
        assert_eq!(app.code, ErrorCode::TimeoutError);

        let app: AppError = StoreError::Call(CallError::transport("refused")).into();
        assert_eq!(app.code, ErrorCode::NetworkError);
    }

    #[test]
    fn test_database_error_hides_detail() {
        let app: AppError = StoreError::Database("relation does not exist".into()).into();
        assert_eq!(app.code, ErrorCode::DatabaseError);
        assert!(!app.message.contains("relation"));
    }

    #[test]
    fn test_map_and_notifier_errors() {
        let app: AppError = MapError::NoResult("nowhere".into()).into();
        assert_eq!(app.code, ErrorCode::GeocodeFailed);

        let app: AppError = NotifierError::Rejected("Domain not verified".into()).into();
        assert_eq!(app.code, ErrorCode::NotifierFailed);
        assert_eq!(app.message, "Domain not verified");
    }
}
