//! Authentication service port interfaces

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCode {
    /// No route to the service (connection refused, DNS, unreachable)
    Network,
    /// The request did not complete within its time bound
    Timeout,
}

/// Body of a service response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Text(String),
    Json(serde_json::Value),
}

impl ResponseBody {
    /// Interpret raw response bytes: JSON when it parses, text otherwise
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// A structured response the service returned with a failure status
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: ResponseBody,
}

/// Failure of a service call.
///
/// Several fields may be populated at once; interpreting them is the job of
/// the error classifier, which applies a fixed precedence.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub code: Option<TransportCode>,
    pub response: Option<ServiceResponse>,
    pub request_sent: bool,
    pub message: String,
}

impl TransportError {
    /// Failure without any structured detail
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            response: None,
            request_sent: false,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            code: Some(TransportCode::Network),
            ..Self::other(message)
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            code: Some(TransportCode::Timeout),
            request_sent: true,
            ..Self::other(message)
        }
    }

    /// Request was sent but nothing came back
    pub fn no_response(message: impl Into<String>) -> Self {
        Self {
            request_sent: true,
            ..Self::other(message)
        }
    }

    /// The service answered with a failure status
    pub fn response(status: u16, body: ResponseBody) -> Self {
        Self {
            code: None,
            response: Some(ServiceResponse { status, body }),
            request_sent: true,
            message: format!("Request failed with status code {}", status),
        }
    }

    /// No route or timeout, as opposed to an answer from the service
    pub fn is_network(&self) -> bool {
        self.code.is_some() || (self.response.is_none() && self.request_sent)
    }
}

/// One part of a multipart request body
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadPart {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

/// Ordered multipart form fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartPayload {
    parts: Vec<(String, PayloadPart)>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts
            .push((name.into(), PayloadPart::Text(value.into())));
        self
    }

    /// Append a file attachment
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push((
            name.into(),
            PayloadPart::File {
                file_name: file_name.into(),
                content_type,
                bytes,
            },
        ));
        self
    }

    /// All parts in insertion order
    pub fn parts(&self) -> &[(String, PayloadPart)] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<(String, PayloadPart)> {
        self.parts
    }

    /// Parts registered under a field name
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PayloadPart> + 'a {
        self.parts
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, part)| part)
    }
}

/// Port for the service liveness probe
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// GET the health endpoint; any success status counts as healthy
    async fn check_health(&self, timeout: Duration) -> Result<(), TransportError>;
}

/// Port for multipart calls to the service
#[async_trait]
pub trait ServiceTransport: Send + Sync {
    /// POST a multipart body and return the JSON body of a success response
    async fn post_multipart(
        &self,
        path: &str,
        payload: MultipartPayload,
        timeout: Duration,
    ) -> Result<serde_json::Value, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_from_json_bytes() {
        let body = ResponseBody::from_bytes(br#"{"detail":"nope"}"#);
        assert_eq!(body, ResponseBody::Json(json!({"detail": "nope"})));
    }

    #[test]
    fn body_from_plain_text() {
        let body = ResponseBody::from_bytes(b"Internal Server Error");
        assert_eq!(body, ResponseBody::Text("Internal Server Error".to_string()));
    }

    #[test]
    fn body_from_whitespace_is_empty() {
        assert_eq!(ResponseBody::from_bytes(b"  \n"), ResponseBody::Empty);
        assert_eq!(ResponseBody::from_bytes(b""), ResponseBody::Empty);
    }

    #[test]
    fn network_classification() {
        assert!(TransportError::network("refused").is_network());
        assert!(TransportError::timeout("slow").is_network());
        assert!(TransportError::no_response("reset").is_network());
        assert!(!TransportError::response(500, ResponseBody::Empty).is_network());
        assert!(!TransportError::other("bad json").is_network());
    }

    #[test]
    fn payload_preserves_order_and_names() {
        let payload = MultipartPayload::new()
            .text("user_id", "u1")
            .file("audio_file", "recording.wav", None, vec![1, 2, 3]);

        assert_eq!(payload.parts().len(), 2);
        assert_eq!(payload.parts()[0].0, "user_id");
        assert_eq!(payload.named("audio_file").count(), 1);
        assert_eq!(payload.named("missing").count(), 0);
    }
}
