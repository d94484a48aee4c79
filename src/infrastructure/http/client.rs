//! Voice authentication service adapter

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{multipart, Client, Response};
use serde_json::Value;

use crate::application::ports::{
    HealthProbe, MultipartPayload, PayloadPart, ResponseBody, ServiceTransport, TransportError,
};

/// Liveness endpoint
pub const HEALTH_PATH: &str = "/health";

const USER_AGENT: &str = concat!("voiceguard/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the voice authentication service
#[derive(Debug, Clone)]
pub struct HttpServiceClient {
    client: Client,
    base_url: String,
}

impl HttpServiceClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn into_form(payload: MultipartPayload) -> Result<multipart::Form, TransportError> {
        let mut form = multipart::Form::new();
        for (name, part) in payload.into_parts() {
            form = match part {
                PayloadPart::Text(value) => form.text(name, value),
                PayloadPart::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mut part = multipart::Part::bytes(bytes).file_name(file_name);
                    if let Some(content_type) = content_type {
                        part = part.mime_str(&content_type).map_err(|e| {
                            TransportError::other(format!(
                                "Invalid content type {}: {}",
                                content_type, e
                            ))
                        })?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }

    /// Body of a success response, or the structured failure
    async fn read(response: Response) -> Result<Vec<u8>, TransportError> {
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();
        if !status.is_success() {
            return Err(TransportError::response(
                status.as_u16(),
                ResponseBody::from_bytes(&body),
            ));
        }
        Ok(body)
    }
}

/// Classify a reqwest failure by where it happened
fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    let message = e.to_string();
    if e.is_timeout() {
        TransportError::timeout(message)
    } else if e.is_connect() {
        TransportError::network(message)
    } else if e.is_request() || e.is_body() || e.is_decode() {
        TransportError::no_response(message)
    } else {
        TransportError::other(message)
    }
}

/// A 2xx body as JSON; text that is not JSON passes through as a string
fn success_body(body: &[u8]) -> Value {
    match ResponseBody::from_bytes(body) {
        ResponseBody::Empty => Value::Null,
        ResponseBody::Json(value) => value,
        ResponseBody::Text(text) => {
            tracing::debug!(%text, "service replied with non-JSON body");
            Value::String(text)
        }
    }
}

#[async_trait]
impl HealthProbe for HttpServiceClient {
    async fn check_health(&self, timeout: Duration) -> Result<(), TransportError> {
        let response = self
            .client
            .get(self.url(HEALTH_PATH))
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read(response).await.map(|_| ())
    }
}

#[async_trait]
impl ServiceTransport for HttpServiceClient {
    async fn post_multipart(
        &self,
        path: &str,
        payload: MultipartPayload,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let form = Self::into_form(payload)?;
        let response = self
            .client
            .post(self.url(path))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .timeout(timeout)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let body = Self::read(response).await?;
        Ok(success_body(&body))
    }
}
