use serde_json::Value;

/// Returned when a thrown value carries nothing printable.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Normalize an arbitrary error value to a string a client can display.
///
/// Strings are returned as-is and numbers are printed. Objects yield
/// `"<code>: <message>"` when both are present, otherwise their `message`, otherwise
/// their `stack`, each normalized in turn. Anything else yields
/// [`FALLBACK_ERROR_MESSAGE`].
pub fn e_to_string(e: &Value) -> String {
    match e {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Object(fields) => match (fields.get("code"), fields.get("message")) {
            (Some(code), Some(message)) => {
                format!("{}: {}", e_to_string(code), e_to_string(message))
            }
            (None, Some(message)) => e_to_string(message),
            _ => match fields.get("stack") {
                Some(stack) => e_to_string(stack),
                None => FALLBACK_ERROR_MESSAGE.to_string(),
            },
        },
        _ => FALLBACK_ERROR_MESSAGE.to_string(),
    }
}
