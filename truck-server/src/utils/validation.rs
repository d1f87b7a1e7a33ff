//! Input validation helpers
//!
//! Text length limits and field checks shared by the order form and the
//! admin handlers. Every failure is an [`AppError`] so handlers can `?` it.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{MAX_RATING, MIN_RATING};
use validator::ValidateEmail;

// ── Text length limits ──────────────────────────────────────────────

/// Names: customers, locations, menu items, blog authors
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions, excerpts, review comments
pub const MAX_NOTE_LEN: usize = 2000;

/// Blog post bodies
pub const MAX_CONTENT_LEN: usize = 100_000;

/// Phone numbers and other short identifiers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

pub const MAX_URL_LEN: usize = 2048;

pub const MAX_ADDRESS_LEN: usize = 500;

// ── Cart limits ─────────────────────────────────────────────────────

/// Most of one item a single order line may carry
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Highest unit price accepted on an order line (10,000.00)
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 2);

// ── Field checks ────────────────────────────────────────────────────

/// Required string: non-blank and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::required(field));
    }
    check_len(value, field, max_len)
}

/// Optional string: if present, within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) => check_len(v, field, max_len),
        None => Ok(()),
    }
}

fn check_len(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

pub fn validate_email(value: &str, field: &str) -> Result<(), AppError> {
    validate_required_text(value, field, MAX_EMAIL_LEN)?;
    if !value.trim().validate_email() {
        return Err(
            AppError::with_message(ErrorCode::InvalidCustomerDetails, "Invalid email address")
                .with_detail("field", field),
        );
    }
    Ok(())
}

/// Menu prices must be strictly positive
pub fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price <= Decimal::ZERO {
        return Err(AppError::new(ErrorCode::MenuItemInvalidPrice)
            .with_detail("price", price.to_string()));
    }
    Ok(())
}

/// One cart line as submitted: quantity in `1..=MAX_LINE_QUANTITY`, a
/// positive price of at most two decimal places and at most `MAX_UNIT_PRICE`.
pub fn validate_cart_line(
    menu_item_id: &str,
    quantity: u32,
    unit_price: Decimal,
) -> Result<(), AppError> {
    if quantity == 0 || quantity > MAX_LINE_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::InvalidCartLine,
            format!("Quantity must be between 1 and {MAX_LINE_QUANTITY}"),
        )
        .with_detail("menu_item_id", menu_item_id)
        .with_detail("quantity", quantity));
    }
    if unit_price <= Decimal::ZERO
        || unit_price > MAX_UNIT_PRICE
        || unit_price.normalize().scale() > 2
    {
        return Err(AppError::with_message(
            ErrorCode::InvalidCartLine,
            format!("Invalid price {unit_price}"),
        )
        .with_detail("menu_item_id", menu_item_id)
        .with_detail("unit_price", unit_price.to_string()));
    }
    Ok(())
}

pub fn validate_rating(rating: i16) -> Result<(), AppError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::new(ErrorCode::ReviewInvalidRating).with_detail("rating", rating));
    }
    Ok(())
}

pub fn validate_schedule_window(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::new(ErrorCode::InvalidScheduleWindow)
            .with_detail("start_time", start.to_string())
            .with_detail("end_time", end.to_string()));
    }
    Ok(())
}

pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Coordinates out of range: {lat}, {lng}"),
        ));
    }
    Ok(())
}
