//! Request body validation

use serde_json::Value;
use tracing::warn;

/// Outcome of [`validate_body`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyCheck {
    Admit,
    Reject,
}

/// Check that a body is absent, `null`, an object or an array
///
/// Bare strings, numbers and booleans are rejected. Rejection is reported
/// through the log (when `logging` is on) and the return value, never by
/// panicking; the caller turns it into a validation error.
pub fn validate_body(body: Option<&Value>, logging: bool) -> BodyCheck {
    let kind = match body {
        None | Some(Value::Null) | Some(Value::Object(_)) | Some(Value::Array(_)) => {
            return BodyCheck::Admit
        }
        Some(Value::String(_)) => "string",
        Some(Value::Number(_)) => "number",
        Some(Value::Bool(_)) => "boolean",
    };

    if logging {
        warn!("Rejected request body: expected an object or null, got a {kind}");
    }
    BodyCheck::Reject
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn test_admits_object_shapes() {
        assert_eq!(validate_body(None, false), BodyCheck::Admit);
        assert_eq!(validate_body(Some(&Value::Null), false), BodyCheck::Admit);
        assert_eq!(validate_body(Some(&json!({"a": 1})), false), BodyCheck::Admit);
        assert_eq!(validate_body(Some(&json!([1, 2])), false), BodyCheck::Admit);
    }

    #[test]
    fn test_rejects_primitives() {
        assert_eq!(validate_body(Some(&json!("text")), false), BodyCheck::Reject);
        assert_eq!(validate_body(Some(&json!(12)), false), BodyCheck::Reject);
        assert_eq!(validate_body(Some(&json!(true)), false), BodyCheck::Reject);
    }

    #[test]
    #[traced_test]
    fn test_rejection_is_logged() {
        validate_body(Some(&json!(3.5)), true);
        assert!(logs_contain("Rejected request body"));
        assert!(logs_contain("got a number"));
    }

    #[test]
    #[traced_test]
    fn test_rejection_silent_without_logging() {
        validate_body(Some(&json!("x")), false);
        assert!(!logs_contain("Rejected request body"));
    }
}
