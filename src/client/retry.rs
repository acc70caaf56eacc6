//! Retry Decorator
//!
//! Wraps a [`Transport`] with bounded delay-then-retry for transient
//! failures of idempotent requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::transport::{ApiRequest, Transport};
use crate::error::Result;

/// Retries per request unless configured otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

// == Retry Policy ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Pause before each retry
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: Duration::from_secs(1),
        }
    }
}

// == Retry Transport ==
/// Retries a request only when the method is idempotent and the error
/// [is retryable](crate::error::ApiError::is_retryable); POST and PATCH go
/// out exactly once.
pub struct RetryTransport {
    inner: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RetryTransport {
    pub fn new(inner: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl Transport for RetryTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Value> {
        let mut attempt = 0;
        loop {
            match self.inner.send(request).await {
                Ok(value) => return Ok(value),
                Err(err)
                    if attempt < self.policy.max_retries
                        && request.method.is_idempotent()
                        && err.is_retryable() =>
                {
                    attempt += 1;
                    warn!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        request, err, attempt, self.policy.max_retries, self.policy.delay
                    );
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
