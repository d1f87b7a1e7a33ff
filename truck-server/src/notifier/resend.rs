//! Resend email API relay

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{NotifierError, NotifierReceipt, OrderEmail, OrderNotifier, render_order_email};
use crate::call::CallError;

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendReply {
    id: Option<String>,
}

/// Renders the confirmation and sends it through Resend
pub struct ResendRelay {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
    support_email: String,
}

impl ResendRelay {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        support_email: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            from: from.into(),
            support_email: support_email.into(),
        }
    }
}

#[async_trait]
impl OrderNotifier for ResendRelay {
    async fn send_order_confirmation(
        &self,
        email: &OrderEmail,
    ) -> Result<NotifierReceipt, NotifierError> {
        email.validate()?;
        let order = &email.order;
        tracing::info!(
            order_id = %order.id,
            location = %order.location_name,
            items = order.items.len(),
            "Processing order email"
        );

        let rendered = render_order_email(order, &self.support_email);
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from,
                to: vec![rendered.to.as_str()],
                subject: &rendered.subject,
                html: &rendered.html,
            })
            .send()
            .await
            .map_err(CallError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(CallError::from)?;
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %body, "Resend API error");
            return Err(NotifierError::from_body(&body));
        }

        let reply: SendReply =
            serde_json::from_str(&body).map_err(|e| CallError::transport(e.to_string()))?;
        tracing::info!(
            message_id = reply.id.as_deref().unwrap_or(""),
            to = %order.customer_email,
            "Email sent successfully"
        );
        Ok(NotifierReceipt {
            message_id: reply.id,
        })
    }
}
