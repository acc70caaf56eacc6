//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use super::transport::{ApiRequest, Method, Transport};
use crate::error::{ApiError, Result};

type Handler = Box<dyn Fn(&ApiRequest) -> Result<Value> + Send + Sync>;

/// Answers from a queue of scripted results first, then from a handler.
/// Every request is recorded before it is answered.
#[derive(Default)]
pub struct MockTransport {
    scripted: Mutex<VecDeque<Result<Value>>>,
    handler: Option<Handler>,
    calls: Mutex<Vec<ApiRequest>>,
    read_gate: Option<Arc<Notify>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Some(Box::new(handler)),
            ..Self::default()
        }
    }

    /// GET requests wait for one `notify_one` on `gate` before answering.
    pub fn gate_reads(mut self, gate: Arc<Notify>) -> Self {
        self.read_gate = Some(gate);
        self
    }

    pub fn push_ok(&self, value: Value) {
        self.scripted.lock().push_back(Ok(value));
    }

    pub fn push_err(&self, err: ApiError) {
        self.scripted.lock().push_back(Err(err));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    /// Number of recorded requests with this method and path.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Value> {
        self.calls.lock().push(request.clone());

        if request.method == Method::Get {
            if let Some(gate) = &self.read_gate {
                gate.notified().await;
            }
        }

        if let Some(result) = self.scripted.lock().pop_front() {
            return result;
        }
        match &self.handler {
            Some(handler) => handler(request),
            None => Err(ApiError::Internal(format!("no scripted response for {}", request))),
        }
    }
}
