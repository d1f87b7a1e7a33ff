//! `POST /functions/send-order-email`
//!
//! Same contract as the hosted function: `{order: {...}}` in,
//! `{success: true, messageId}` out, or a 500 with
//! `{error: "Failed to send confirmation email", details}`.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use shared::error::EMAIL_FAILED_FALLBACK;

use crate::notifier::{NotifierError, OrderEmail, OrderNotifier};
use crate::state::AppState;

fn failure(details: String) -> Response {
    failure_with(StatusCode::INTERNAL_SERVER_ERROR, details)
}

fn failure_with(status: StatusCode, details: String) -> Response {
    (
        status,
        Json(json!({
            "error": EMAIL_FAILED_FALLBACK,
            "details": details,
        })),
    )
        .into_response()
}

pub async fn send_order_email(
    State(state): State<AppState>,
    Json(email): Json<OrderEmail>,
) -> Response {
    if let Err(e) = email.validate() {
        tracing::warn!(order_id = %email.order.id, error = %e, "Rejected order email payload");
        return failure_with(StatusCode::BAD_REQUEST, e.user_message());
    }

    let Some(relay) = state.relay.as_ref() else {
        tracing::error!("RESEND_API_KEY environment variable is not set");
        return failure(
            NotifierError::NotConfigured("RESEND_API_KEY environment variable is not set".into())
                .to_string(),
        );
    };

    match relay.send_order_confirmation(&email).await {
        Ok(receipt) => Json(json!({
            "success": true,
            "messageId": receipt.message_id,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(order_id = %email.order.id, error = %e, "Error processing order email");
            failure(e.user_message())
        }
    }
}
