//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order and catering errors
//! - 5xxx: Content errors
//! - 6xxx: Menu errors
//! - 7xxx: Location and schedule errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as `u16` on the wire so the admin console and the public
/// site can branch on a number instead of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order / Catering ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Cart is empty
    OrderEmpty = 4002,
    /// No pickup location selected
    NoLocationSelected = 4003,
    /// No pickup time selected
    NoTimeSlotSelected = 4004,
    /// Pickup time label could not be parsed
    InvalidTimeSlot = 4005,
    /// Customer name, email or phone missing or malformed
    InvalidCustomerDetails = 4006,
    /// Unknown order status value
    InvalidOrderStatus = 4007,
    /// Cart line with a quantity or price out of range
    InvalidCartLine = 4008,
    /// Order header write failed, nothing was stored
    OrderCreateFailed = 4101,
    /// Order header stored but its line items were not
    OrderPartiallyCreated = 4102,
    /// Order write timed out and may have been applied
    OrderOutcomeUnknown = 4103,
    /// Catering event date inside the notice period
    CateringTooSoon = 4201,
    /// Unknown catering package id
    CateringUnknownPackage = 4202,
    /// Catering package ordered below its minimum quantity
    CateringBelowMinimum = 4203,

    // ==================== 5xxx: Content ====================
    /// Blog post not found
    BlogPostNotFound = 5001,
    /// Unknown blog status value
    InvalidBlogStatus = 5002,
    /// Review rating outside 1..=5
    ReviewInvalidRating = 5101,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item price must be positive
    MenuItemInvalidPrice = 6002,
    /// Unknown menu category
    InvalidMenuCategory = 6003,

    // ==================== 7xxx: Location / Schedule ====================
    /// Location not found
    LocationNotFound = 7001,
    /// Location has no coordinates and none could be resolved
    LocationMissingCoordinates = 7002,
    /// Schedule entry not found
    ScheduleNotFound = 7101,
    /// Schedule start time is not before its end time
    InvalidScheduleWindow = 7102,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    NetworkError = 9003,
    TimeoutError = 9004,
    ConfigError = 9005,
    /// Confirmation email could not be sent
    NotifierFailed = 9101,
    /// Map script could not be loaded
    MapUnavailable = 9201,
    /// Address could not be geocoded
    GeocodeFailed = 9202,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Please fill in all required fields",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Your cart is empty",
            ErrorCode::NoLocationSelected => "Please select a pickup location",
            ErrorCode::NoTimeSlotSelected => "Please select a pickup time",
            ErrorCode::InvalidTimeSlot => "Pickup time is not valid",
            ErrorCode::InvalidCustomerDetails => "Please fill in all required fields",
            ErrorCode::InvalidOrderStatus => "Invalid order status",
            ErrorCode::InvalidCartLine => "A cart item has an invalid quantity or price",
            ErrorCode::OrderCreateFailed => "Failed to place order",
            ErrorCode::OrderPartiallyCreated => {
                "Order was created but its items could not be saved"
            }
            ErrorCode::OrderOutcomeUnknown => {
                "Order request timed out and may have been placed"
            }
            ErrorCode::CateringTooSoon => "Catering requests need 72 hours notice",
            ErrorCode::CateringUnknownPackage => "Unknown catering package",
            ErrorCode::CateringBelowMinimum => "Quantity is below the package minimum",

            // Content
            ErrorCode::BlogPostNotFound => "Blog post not found",
            ErrorCode::InvalidBlogStatus => "Invalid blog post status",
            ErrorCode::ReviewInvalidRating => "Rating must be between 1 and 5",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidPrice => "Price must be greater than 0",
            ErrorCode::InvalidMenuCategory => "Unknown menu category",

            // Location / Schedule
            ErrorCode::LocationNotFound => "Location not found",
            ErrorCode::LocationMissingCoordinates => "Location requires latitude and longitude",
            ErrorCode::ScheduleNotFound => "Schedule not found",
            ErrorCode::InvalidScheduleWindow => "Start time must be before end time",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NotifierFailed => "Failed to send confirmation email",
            ErrorCode::MapUnavailable => "Map is currently unavailable",
            ErrorCode::GeocodeFailed => "Address could not be located",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::NoLocationSelected),
            4004 => Ok(ErrorCode::NoTimeSlotSelected),
            4005 => Ok(ErrorCode::InvalidTimeSlot),
            4006 => Ok(ErrorCode::InvalidCustomerDetails),
            4007 => Ok(ErrorCode::InvalidOrderStatus),
            4008 => Ok(ErrorCode::InvalidCartLine),
            4101 => Ok(ErrorCode::OrderCreateFailed),
            4102 => Ok(ErrorCode::OrderPartiallyCreated),
            4103 => Ok(ErrorCode::OrderOutcomeUnknown),
            4201 => Ok(ErrorCode::CateringTooSoon),
            4202 => Ok(ErrorCode::CateringUnknownPackage),
            4203 => Ok(ErrorCode::CateringBelowMinimum),

            // Content
            5001 => Ok(ErrorCode::BlogPostNotFound),
            5002 => Ok(ErrorCode::InvalidBlogStatus),
            5101 => Ok(ErrorCode::ReviewInvalidRating),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemInvalidPrice),
            6003 => Ok(ErrorCode::InvalidMenuCategory),

            // Location / Schedule
            7001 => Ok(ErrorCode::LocationNotFound),
            7002 => Ok(ErrorCode::LocationMissingCoordinates),
            7101 => Ok(ErrorCode::ScheduleNotFound),
            7102 => Ok(ErrorCode::InvalidScheduleWindow),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::NotifierFailed),
            9201 => Ok(ErrorCode::MapUnavailable),
            9202 => Ok(ErrorCode::GeocodeFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
