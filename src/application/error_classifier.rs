//! Maps service call failures to user-facing messages
//!
//! Precedence, first match wins:
//! 1. no route to the service
//! 2. timeout
//! 3. structured service response (body text, `detail`, `message`, status)
//! 4. request sent without a response
//! 5. the raw error message, or a generic fallback

use serde_json::Value;

use super::ports::{ResponseBody, ServiceResponse, TransportCode, TransportError};

pub const NETWORK_MESSAGE: &str =
    "Cannot connect to backend server. Please ensure the backend is running.";

pub const TIMEOUT_MESSAGE: &str = "Request timeout. Server is taking too long to respond.";

pub const NO_RESPONSE_MESSAGE: &str =
    "No response from server. Please check if the backend is running.";

pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

/// User-facing message for a failed service call
pub fn classify(error: &TransportError) -> String {
    match error.code {
        Some(TransportCode::Network) => return NETWORK_MESSAGE.to_string(),
        Some(TransportCode::Timeout) => return TIMEOUT_MESSAGE.to_string(),
        None => {}
    }

    if let Some(response) = &error.response {
        return response_message(response);
    }

    if error.request_sent {
        return NO_RESPONSE_MESSAGE.to_string();
    }

    let raw = error.message.trim();
    if raw.is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        raw.to_string()
    }
}

fn response_message(response: &ServiceResponse) -> String {
    let status_message = || format!("Server error: {}", response.status);

    match &response.body {
        ResponseBody::Text(text) => text.clone(),
        ResponseBody::Json(Value::String(text)) => text.clone(),
        ResponseBody::Json(Value::Object(map)) => {
            if let Some(detail) = map.get("detail").filter(|v| is_present(v)) {
                return detail_message(detail);
            }
            if let Some(message) = map.get("message").filter(|v| is_present(v)) {
                return render(message);
            }
            status_message()
        }
        ResponseBody::Json(_) | ResponseBody::Empty => status_message(),
    }
}

/// `detail` is a string, a list of validation errors, or anything else
fn detail_message(detail: &Value) -> String {
    match detail {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.get("msg")
                    .filter(|v| is_present(v))
                    .map(render)
                    .unwrap_or_else(|| render(item))
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Null, false, zero and empty strings count as absent
pub(crate) fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
