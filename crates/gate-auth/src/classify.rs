//! Identity provider error classification.
//!
//! The provider reports failures either as JSON (`{"message": ..., "name": ..., "status": ...}`)
//! or as plain text in the form `Error: <message>`.

/// Messages meaning the presented credential is unusable but the session can
/// still be recovered with another credential or a fresh login.
pub const RECOVERABLE_MESSAGES: [&str; 7] = [
    "token expired",
    "token revoked",
    "token not found",
    "invalid_request",
    "code expired",
    "code required",
    "invalid code",
];

/// Extract the error message from a response body.
///
/// A body that parses as JSON is read as `{message}` and nothing else; only
/// non-JSON bodies go through the `Error: <message>` convention, where the
/// message is the segment between the first and second `": "`.
#[must_use]
pub fn extract_message(body: &str) -> Option<String> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
        Err(_) => body.split(": ").nth(1).map(str::to_owned),
    }
}

/// Whether an error response body means "credential invalid or expired".
#[must_use]
pub fn is_credential_invalid(body: &str) -> bool {
    extract_message(body).is_some_and(|message| RECOVERABLE_MESSAGES.contains(&message.as_str()))
}
