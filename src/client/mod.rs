//! TaskFlow Client Module
//!
//! Talks to the upstream TaskFlow API and keeps its read responses in the
//! shared TTL cache.
//!
//! # Components
//! - `transport`: the request type and the [`Transport`] seam
//! - `http`: reqwest implementation of the seam
//! - `retry`: delay-then-retry decorator for idempotent requests
//! - `keys`: canonical cache key construction
//! - `coalesce`: one fetch per key at a time
//! - `resources`: the cache-aware resource client

mod coalesce;
mod http;
mod keys;
#[cfg(test)]
pub(crate) mod mock;
mod resources;
mod retry;
mod transport;

pub use coalesce::InFlight;
pub use http::HttpTransport;
pub use keys::{CacheKey, ANALYTICS_PREFIX, CATEGORIES_KEY, TASK_LIST_PREFIX, TASK_PREFIX};
pub use resources::{CacheTtls, Payload, ResourceClient};
pub use retry::{RetryPolicy, RetryTransport, DEFAULT_MAX_RETRIES};
pub use transport::{ApiRequest, Method, Transport};
