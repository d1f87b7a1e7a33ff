//! Unified error system for the food-truck backend
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order and catering errors
//! - 5xxx: Content errors (blog posts, reviews)
//! - 6xxx: Menu errors
//! - 7xxx: Location and schedule errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::OrderEmpty);
//!
//! let err = AppError::validation("Please fill in all required fields")
//!     .with_detail("field", "customer_email");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(2));
//! ```

mod category;
mod codes;
mod http;
mod message;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use message::{extract_error_message, EMAIL_FAILED_FALLBACK, ORDER_FAILED_FALLBACK};
pub use types::{ApiResponse, AppError};
