//! Order confirmation email
//!
//! [`OrderNotifier`] is the narrow interface the order flow talks to. The
//! hosted function ([`FunctionNotifier`]) is the normal path; [`ResendRelay`]
//! is what that function does and is also usable directly.

mod email;
mod function;
mod resend;

pub use email::{RenderedEmail, format_money, format_pickup_time, render_order_email};
pub use function::FunctionNotifier;
pub use resend::ResendRelay;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{EMAIL_FAILED_FALLBACK, extract_error_message};
use thiserror::Error;

use crate::call::CallError;
use crate::utils::validation::{MAX_LINE_QUANTITY, MAX_UNIT_PRICE};

/// Request body sent to the email function: `{"order": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEmail {
    pub order: OrderEmailBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEmailBody {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub location_name: String,
    pub pickup_time: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub items: Vec<OrderEmailItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEmailItem {
    #[serde(rename = "menuItem")]
    pub menu_item: EmailMenuItem,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMenuItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderEmailItem {
    /// `None` on overflow
    pub fn line_total(&self) -> Option<Decimal> {
        self.menu_item.price.checked_mul(Decimal::from(self.quantity))
    }
}

impl OrderEmail {
    /// Reject payloads no order could have produced
    pub fn validate(&self) -> Result<(), NotifierError> {
        let order = &self.order;
        if order.total_amount.is_sign_negative() {
            return Err(NotifierError::InvalidOrder(
                "total_amount must not be negative".into(),
            ));
        }
        for item in &order.items {
            let quantity_ok = u32::try_from(item.quantity)
                .is_ok_and(|q| (1..=MAX_LINE_QUANTITY).contains(&q));
            let price = item.menu_item.price;
            if !quantity_ok || price.is_sign_negative() || price > MAX_UNIT_PRICE {
                return Err(NotifierError::InvalidOrder(format!(
                    "invalid quantity or price for {}",
                    item.menu_item.name
                )));
            }
        }
        Ok(())
    }
}

/// What a successful send hands back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifierReceipt {
    #[serde(rename = "messageId")]
    pub message_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum NotifierError {
    /// The service answered with an error; the message is already unwrapped
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error("email delivery is not configured: {0}")]
    NotConfigured(String),

    #[error("invalid order email: {0}")]
    InvalidOrder(String),
}

impl NotifierError {
    /// Rejection from a raw response body
    pub fn from_body(body: &str) -> Self {
        Self::Rejected(extract_error_message(body, EMAIL_FAILED_FALLBACK))
    }

    /// Text suitable for showing to the customer
    pub fn user_message(&self) -> String {
        match self {
            NotifierError::Rejected(msg) => msg.clone(),
            NotifierError::Call(e) => extract_error_message(&e.message, EMAIL_FAILED_FALLBACK),
            NotifierError::NotConfigured(_) => EMAIL_FAILED_FALLBACK.to_string(),
            NotifierError::InvalidOrder(msg) => msg.clone(),
        }
    }
}

#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn send_order_confirmation(
        &self,
        email: &OrderEmail,
    ) -> Result<NotifierReceipt, NotifierError>;
}

/// Used when no email route is configured
#[derive(Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl OrderNotifier for NoopNotifier {
    async fn send_order_confirmation(
        &self,
        email: &OrderEmail,
    ) -> Result<NotifierReceipt, NotifierError> {
        tracing::info!(
            order_id = %email.order.id,
            "Email delivery not configured, skipping confirmation"
        );
        Ok(NotifierReceipt::default())
    }
}
