//! Client for the hosted `send-order-email` function

use async_trait::async_trait;
use serde::Deserialize;

use super::{NotifierError, NotifierReceipt, OrderEmail, OrderNotifier};
use crate::call::CallError;

#[derive(Debug, Default, Deserialize)]
struct FunctionReply {
    #[serde(default)]
    success: bool,
    #[serde(rename = "messageId")]
    message_id: Option<String>,
    error: Option<serde_json::Value>,
}

/// POSTs the order payload to the function URL with an optional bearer key
pub struct FunctionNotifier {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl FunctionNotifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl OrderNotifier for FunctionNotifier {
    async fn send_order_confirmation(
        &self,
        email: &OrderEmail,
    ) -> Result<NotifierReceipt, NotifierError> {
        let mut request = self.client.post(&self.url).json(email);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(CallError::from)?;
        let status = response.status();
        let body = response.text().await.map_err(CallError::from)?;

        if !status.is_success() {
            tracing::warn!(
                order_id = %email.order.id,
                status = status.as_u16(),
                "Email function returned an error"
            );
            return Err(NotifierError::from_body(&body));
        }

        let reply: FunctionReply = serde_json::from_str(&body).unwrap_or_default();
        if reply.error.is_some() || !reply.success {
            return Err(NotifierError::from_body(&body));
        }

        tracing::info!(
            order_id = %email.order.id,
            message_id = reply.message_id.as_deref().unwrap_or(""),
            "Confirmation email sent"
        );
        Ok(NotifierReceipt {
            message_id: reply.message_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::tests::sample_email;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/send-order-email")
    }

    #[tokio::test]
    async fn test_success_reply() {
        let router = Router::new().route(
            "/send-order-email",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["order"]["id"], "order-1");
                Json(json!({"success": true, "messageId": "msg_123"}))
            }),
        );
        let url = serve(router).await;

        let notifier = FunctionNotifier::new(reqwest::Client::new(), url, Some("key".into()));
        let receipt = notifier
            .send_order_confirmation(&sample_email())
            .await
            .unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("msg_123"));
    }

    #[tokio::test]
    async fn test_error_reply_uses_details() {
        let router = Router::new().route(
            "/send-order-email",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Failed to send confirmation email",
                        "details": "The domain is not verified"
                    })),
                )
            }),
        );
        let url = serve(router).await;

        let notifier = FunctionNotifier::new(reqwest::Client::new(), url, None);
        let err = notifier
            .send_order_confirmation(&sample_email())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "The domain is not verified");
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        let notifier = FunctionNotifier::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/send-order-email",
            None,
        );
        let err = notifier
            .send_order_confirmation(&sample_email())
            .await
            .unwrap_err();
        assert!(matches!(err, NotifierError::Call(_)));
    }
}
