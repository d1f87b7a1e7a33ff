//! Order booking
//!
//! [`OrderService::submit`] turns a booking request (location, day, pickup
//! slot, customer, cart) into a stored `pending` order and a best-effort
//! confirmation email.

mod service;

pub use service::{OrderService, pickup_timestamp};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode, ORDER_FAILED_FALLBACK};
use shared::models::Order;
use thiserror::Error;

use crate::cart::Cart;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub location_id: Option<String>,
    pub date: NaiveDate,
    /// 12-hour label as offered by the availability endpoint
    #[serde(default)]
    pub time_slot: Option<String>,
    pub customer: CustomerDetails,
    #[serde(default)]
    pub cart: Cart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub line_total: Decimal,
}

/// Non-fatal problem during a submission that did succeed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionWarning {
    EmailNotSent { message: String },
}

/// Everything the confirmation view shows; built from the submission itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order: Order,
    pub location_name: String,
    pub items: Vec<ConfirmedItem>,
    pub email_message_id: Option<String>,
    pub warnings: Vec<SubmissionWarning>,
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Please select a location")]
    NoLocation,

    #[error("Please select a pickup time")]
    NoTimeSlot,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("{0}")]
    InvalidCustomer(AppError),

    /// A cart line with a bad quantity or price, or a total out of range
    #[error("{0}")]
    InvalidCart(AppError),

    #[error("Location {0} not found")]
    UnknownLocation(String),

    #[error("Menu item {0} not found")]
    UnknownMenuItem(String),

    /// A read before the order write timed out; nothing was written
    #[error("Order lookup timed out: {0}")]
    LookupTimedOut(String),

    #[error("Invalid pickup time: {0}")]
    InvalidTimeSlot(String),

    #[error("Failed to place order: {0}")]
    CreateFailed(String),

    /// The order row exists but its items do not
    #[error("Order {order_id} was saved without its items: {reason}")]
    PartialOrder { order_id: String, reason: String },

    /// The write timed out and may or may not have been applied
    #[error("Order outcome unknown: {0}")]
    OutcomeUnknown(String),
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        let message = e.to_string();
        match e {
            OrderError::NoLocation => AppError::new(ErrorCode::NoLocationSelected),
            OrderError::NoTimeSlot => AppError::new(ErrorCode::NoTimeSlotSelected),
            OrderError::EmptyCart => AppError::new(ErrorCode::OrderEmpty),
            OrderError::InvalidCustomer(inner) | OrderError::InvalidCart(inner) => inner,
            OrderError::UnknownLocation(id) => {
                AppError::with_message(ErrorCode::LocationNotFound, message)
                    .with_detail("location_id", id)
            }
            OrderError::UnknownMenuItem(id) => {
                AppError::with_message(ErrorCode::MenuItemNotFound, message)
                    .with_detail("menu_item_id", id)
            }
            OrderError::LookupTimedOut(_) => AppError::timeout(message),
            OrderError::InvalidTimeSlot(label) => {
                AppError::with_message(ErrorCode::InvalidTimeSlot, message)
                    .with_detail("time_slot", label)
            }
            OrderError::CreateFailed(_) => {
                AppError::with_message(ErrorCode::OrderCreateFailed, ORDER_FAILED_FALLBACK)
            }
            OrderError::PartialOrder { order_id, .. } => {
                AppError::new(ErrorCode::OrderPartiallyCreated).with_detail("order_id", order_id)
            }
            OrderError::OutcomeUnknown(_) => AppError::new(ErrorCode::OrderOutcomeUnknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let cases = [
            (OrderError::NoLocation, ErrorCode::NoLocationSelected),
            (OrderError::NoTimeSlot, ErrorCode::NoTimeSlotSelected),
            (OrderError::EmptyCart, ErrorCode::OrderEmpty),
            (
                OrderError::CreateFailed("boom".into()),
                ErrorCode::OrderCreateFailed,
            ),
            (
                OrderError::OutcomeUnknown("timeout".into()),
                ErrorCode::OrderOutcomeUnknown,
            ),
            (
                OrderError::UnknownMenuItem("ghost".into()),
                ErrorCode::MenuItemNotFound,
            ),
            (
                OrderError::LookupTimedOut("get_location".into()),
                ErrorCode::TimeoutError,
            ),
            (
                OrderError::InvalidCart(AppError::new(ErrorCode::InvalidCartLine)),
                ErrorCode::InvalidCartLine,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(AppError::from(err).code, code);
        }
    }

    #[test]
    fn test_partial_order_keeps_id() {
        let app: AppError = OrderError::PartialOrder {
            order_id: "o-1".into(),
            reason: "items".into(),
        }
        .into();
        assert_eq!(app.code, ErrorCode::OrderPartiallyCreated);
        let details = app.details.unwrap();
        assert_eq!(details["order_id"], "o-1");
    }

    #[test]
    fn test_booking_request_defaults() {
        let req: BookingRequest = serde_json::from_value(serde_json::json!({
            "date": "2024-06-01",
            "customer": {"name": "Ama"}
        }))
        .unwrap();
        assert!(req.location_id.is_none());
        assert!(req.time_slot.is_none());
        assert!(req.cart.is_empty());
        assert_eq!(req.customer.email, "");
    }
}
