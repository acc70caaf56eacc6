//! HTTP Transport
//!
//! reqwest-backed [`Transport`] that talks to the TaskFlow REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::transport::{ApiRequest, Method, Transport};
use crate::error::{ApiError, Result};

// == Http Transport ==
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Creates a transport for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a transport around an existing reqwest client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Value> {
        let url = self.url(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!("{} -> {}", request, status);

        if !status.is_success() {
            return Err(ApiError::upstream(
                status.as_u16(),
                error_message(status, &text),
            ));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Understands `{"detail": ...}`, `{"message": ...}` and `{"error": ...}`
/// bodies; anything else falls back to the raw text or the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for field in ["detail", "message", "error"] {
            match json.get(field) {
                Some(Value::String(message)) => return message.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let transport = HttpTransport::with_client(Client::new(), "http://localhost:8000/api/");
        assert_eq!(transport.base_url(), "http://localhost:8000/api");
        assert_eq!(transport.url("/tasks"), "http://localhost:8000/api/tasks");
        assert_eq!(transport.url("tasks/1"), "http://localhost:8000/api/tasks/1");
    }

    #[test]
    fn test_error_message_detail() {
        let message = error_message(StatusCode::NOT_FOUND, r#"{"detail":"Task not found"}"#);
        assert_eq!(message, "Task not found");
    }

    #[test]
    fn test_error_message_structured_detail() {
        let message = error_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","title"],"msg":"field required"}]}"#,
        );
        assert!(message.contains("field required"));
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, ""),
            "Bad Gateway"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            "boom"
        );
        assert_eq!(
            error_message(StatusCode::CONFLICT, r#"{"message":"duplicate"}"#),
            "duplicate"
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_error() {
        // Port 9 (discard) on loopback is expected to refuse connections
        let transport =
            HttpTransport::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

        let err = transport
            .send(&ApiRequest::get("/tasks"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
        assert!(err.is_retryable());
    }
}
