//! Order admin

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderDetail, OrderQuery, OrderStatus, OrderStatusUpdate};

use crate::api::{ApiResult, contains_ci, search_term};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api/admin/orders",
        Router::new()
            .route("/", get(list))
            .route("/{id}", get(get_by_id))
            .route("/{id}/status", put(update_status)),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Customer name/email search
    pub q: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
}

fn parse_status(raw: Option<&str>) -> Result<Option<OrderStatus>, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|e: shared::models::ParseStatusError| {
            AppError::with_message(ErrorCode::InvalidOrderStatus, e.to_string())
        }),
    }
}

/// GET /api/admin/orders - newest first, with location and items
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<OrderDetail>> {
    let query = OrderQuery {
        status: parse_status(params.status.as_deref())?,
        limit: params.limit,
        ..Default::default()
    };
    let mut orders = state.store.list_orders(&query).await?;
    if let Some(q) = search_term(params.q.as_deref()) {
        orders.retain(|o| {
            contains_ci(&o.order.customer_name, &q) || contains_ci(&o.order.customer_email, &q)
        });
    }
    Ok(Json(orders))
}

/// GET /api/admin/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<OrderDetail> {
    Ok(Json(state.store.get_order(&id).await?))
}

/// PUT /api/admin/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> ApiResult<Order> {
    let order = state.store.update_order_status(&id, payload.status).await?;
    tracing::info!(id = %id, status = %order.status, "Order status updated");
    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("all")).unwrap(), None);
        assert_eq!(
            parse_status(Some("preparing")).unwrap(),
            Some(OrderStatus::Preparing)
        );
        assert_eq!(
            parse_status(Some("lost")).unwrap_err().code,
            ErrorCode::InvalidOrderStatus
        );
    }
}
