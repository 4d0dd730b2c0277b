//! Backend error-envelope probing
//!
//! The backend is inconsistent about error payloads: some endpoints answer
//! `{ "message": ... }`, older ones `{ "Error": ... }`, a few return a bare
//! JSON string or plain text. The probe order below is fixed; when nothing
//! usable is found, the fallback is a generic Spanish message naming the
//! failed action.

use serde_json::Value;

/// Extracts a user-presentable message from an error response body
pub fn probe_error_message(body: &str, action: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = non_blank(value.get("message").and_then(Value::as_str)) {
            return message;
        }
        if let Some(message) = non_blank(value.get("Error").and_then(Value::as_str)) {
            return message;
        }
        if let Some(message) = non_blank(value.as_str()) {
            return message;
        }
    }

    // Plain-text bodies pass through unless they look like an HTML error page
    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('<') && trimmed.len() <= 300 {
        return trimmed.to_string();
    }

    format!("Ocurrió un error al {action}")
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
