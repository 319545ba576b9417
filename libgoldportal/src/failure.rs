//! Turning data service failures into messages a person can act on.

use serde_json::Value;
use std::error::Error;

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

const REJECT_TEXT_MARKER: &str = "Reject text:";
const AUTHORIZATION_PATTERNS: [&str; 4] = ["unauthorized", "sign in", "signed in", "authenticated"];

/// Extracts a readable message from an error value as reported by the data service.
///
/// Strings are taken as they are. Objects yield their `message` (narrowed down to
/// the reject text when there is one), otherwise the message of their `cause`,
/// otherwise their `error_description`, otherwise their json text.
pub fn extract_error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => {
            if let Some(Value::String(message)) = fields.get("message") {
                return narrow_message(message);
            }

            if let Some(cause) = fields.get("cause").filter(|c| is_truthy(c)) {
                return extract_error_message(cause);
            }

            if let Some(Value::String(description)) = fields.get("error_description") {
                return description.clone();
            }

            if fields.is_empty() {
                UNKNOWN_ERROR_MESSAGE.to_string()
            } else {
                error.to_string()
            }
        }
        _ => UNKNOWN_ERROR_MESSAGE.to_string(),
    }
}

/// Same as [`extract_error_message`] for native errors.
///
/// Errors that display as nothing are skipped in favour of their source.
pub fn error_message(error: &(dyn Error + 'static)) -> String {
    let message = error.to_string();
    if !message.is_empty() {
        return narrow_message(&message);
    }

    match error.source() {
        Some(source) => error_message(source),
        None => UNKNOWN_ERROR_MESSAGE.to_string(),
    }
}

/// Whether the message says the caller has to sign in first.
pub fn is_authorization_failure(message: &str) -> bool {
    let message = message.to_lowercase();

    AUTHORIZATION_PATTERNS.iter().any(|p| message.contains(p))
}

/// Words a failed data service call for the person who triggered it.
///
/// `action` completes "You need to be signed in to ...", `context` prefixes
/// every other message.
pub fn describe_failure(message: &str, action: &str, context: &str) -> String {
    if is_authorization_failure(message) {
        format!("You need to be signed in to {action}. Please log in and try again.")
    } else {
        format!("{context}: {message}")
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn narrow_message(message: &str) -> String {
    reject_text(message).unwrap_or(message).to_string()
}

fn reject_text(message: &str) -> Option<&str> {
    let start = message.find(REJECT_TEXT_MARKER)? + REJECT_TEXT_MARKER.len();
    let text = message[start..].trim_start();
    let text = text.split('\n').next().unwrap_or_default().trim();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::DataServiceError;
    use serde_json::json;

    #[test]
    fn narrows_message_down_to_reject_text() {
        let error = json!({ "message": "Reject text: Unauthorized" });

        assert_eq!(extract_error_message(&error), "Unauthorized");
    }

    #[test]
    fn reject_text_ends_at_line_break() {
        let error = json!({
            "message": "Call was rejected:\n  Request ID: 42\n  Reject text: Customer not found \n  Error code: None"
        });

        assert_eq!(extract_error_message(&error), "Customer not found");
    }

    #[test]
    fn uses_plain_message_without_marker() {
        let error = json!({ "message": "Actor not available" });

        assert_eq!(extract_error_message(&error), "Actor not available");
    }

    #[test]
    fn follows_nested_cause() {
        let error = json!({ "cause": { "cause": { "message": "Reject text: Not signed in" } } });

        assert_eq!(extract_error_message(&error), "Not signed in");
    }

    #[test]
    fn falls_back_to_error_description() {
        let error = json!({ "cause": null, "error_description": "Delegation expired" });

        assert_eq!(extract_error_message(&error), "Delegation expired");
    }

    #[test]
    fn stringifies_unknown_objects() {
        let error = json!({ "code": 500 });

        assert_eq!(extract_error_message(&error), "{\"code\":500}");
    }

    #[test]
    fn reports_unknown_error_for_empty_values() {
        assert_eq!(extract_error_message(&json!({})), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(extract_error_message(&Value::Null), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(extract_error_message(&json!(17)), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn takes_strings_as_they_are() {
        assert_eq!(extract_error_message(&json!("Timed out")), "Timed out");
    }

    #[test]
    fn extracts_reject_text_from_native_errors() {
        let error = DataServiceError::RejectedError {
            reject_text: "Unauthorized".to_string(),
        };

        assert_eq!(error_message(&error), "Unauthorized");
    }

    #[test]
    fn detects_authorization_failures_case_insensitively() {
        assert!(is_authorization_failure("Unauthorized"));
        assert!(is_authorization_failure("Please SIGN IN first"));
        assert!(is_authorization_failure("caller is not authenticated"));
        assert!(is_authorization_failure("Not signed in"));
        assert!(!is_authorization_failure("Customer not found"));
    }

    #[test]
    fn rewords_authorization_failures_as_sign_in_prompt() {
        assert_eq!(
            describe_failure("Unauthorized", "view daily gold updates", "Failed to load"),
            "You need to be signed in to view daily gold updates. Please log in and try again."
        );
        assert_eq!(
            describe_failure("Disk full", "view daily gold updates", "Failed to load"),
            "Failed to load: Disk full"
        );
    }

    #[test]
    fn rewords_rejected_not_signed_in() {
        let message = extract_error_message(&json!({ "message": "Reject text: Not signed in" }));

        assert_eq!(
            describe_failure(&message, "view feedback", "Failed to load"),
            "You need to be signed in to view feedback. Please log in and try again."
        );
    }

    #[test]
    fn keeps_empty_object_message() {
        assert_eq!(extract_error_message(&json!({ "message": "" })), "");
    }

    #[test]
    fn skips_falsy_cause() {
        let error = json!({ "cause": "", "error_description": "Delegation expired" });
        assert_eq!(extract_error_message(&error), "Delegation expired");

        let error = json!({ "cause": false, "error_description": "Delegation expired" });
        assert_eq!(extract_error_message(&error), "Delegation expired");
    }
}
