//! TaskFlow Cache - TTL response cache for the TaskFlow API
//!
//! Provides a generic TTL cache, a cache-aware client for the TaskFlow REST
//! API, and a small caching gateway that serves it over HTTP.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheStats, CacheStore, SharedCache};
pub use client::{CacheTtls, ResourceClient};
pub use config::Config;
pub use error::{ApiError, ErrorKind};
pub use tasks::spawn_cleanup_task;
