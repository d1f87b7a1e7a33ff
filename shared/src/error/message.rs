//! Human-readable messages from collaborator error payloads

use serde_json::Value;

/// Shown when the confirmation email fails without a usable message
pub const EMAIL_FAILED_FALLBACK: &str = "Failed to send confirmation email";

/// Shown when placing an order fails without a usable message
pub const ORDER_FAILED_FALLBACK: &str = "Failed to place order";

/// Pull the most specific message out of a collaborator error body.
///
/// JSON bodies shaped like `{"error": ..., "details": ...}` yield `details`,
/// then `error`, then `message`. Any other non-blank body is returned as-is.
/// Blank input yields `fallback`.
pub fn extract_error_message(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["details", "error", "message"] {
            match map.get(key) {
                Some(Value::String(s)) if !s.trim().is_empty() => return s.clone(),
                Some(Value::Object(inner)) => {
                    if let Some(Value::String(s)) = inner.get("message")
                        && !s.trim().is_empty()
                    {
                        return s.clone();
                    }
                }
                _ => {}
            }
        }
        return fallback.to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_preferred_over_error() {
        let raw = r#"{"error":"Failed to send confirmation email","details":"Invalid `to` field"}"#;
        assert_eq!(
            extract_error_message(raw, EMAIL_FAILED_FALLBACK),
            "Invalid `to` field"
        );
    }

    #[test]
    fn test_error_when_no_details() {
        let raw = r#"{"error":"Domain not verified"}"#;
        assert_eq!(
            extract_error_message(raw, EMAIL_FAILED_FALLBACK),
            "Domain not verified"
        );
    }

    #[test]
    fn test_nested_message_object() {
        let raw = r#"{"error":{"message":"rate limited"}}"#;
        assert_eq!(extract_error_message(raw, "x"), "rate limited");
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(
            extract_error_message("connection reset", EMAIL_FAILED_FALLBACK),
            "connection reset"
        );
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(
            extract_error_message("", ORDER_FAILED_FALLBACK),
            "Failed to place order"
        );
        assert_eq!(
            extract_error_message("{}", EMAIL_FAILED_FALLBACK),
            EMAIL_FAILED_FALLBACK
        );
        assert_eq!(
            extract_error_message(r#"{"details":"  "}"#, EMAIL_FAILED_FALLBACK),
            EMAIL_FAILED_FALLBACK
        );
    }
}
