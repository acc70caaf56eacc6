//! Resource Access Layer
//!
//! Cache-aware façade over the TaskFlow API. Reads are served from the
//! shared TTL cache when possible; writes always go upstream and, once they
//! succeed, invalidate every cached view they could have made stale.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::coalesce::InFlight;
use super::keys::{CacheKey, ANALYTICS_PREFIX, TASK_LIST_PREFIX, TASK_PREFIX};
use super::transport::{ApiRequest, Transport};
use crate::cache::{CacheStats, SharedCache};
use crate::error::Result;
use crate::models::{
    AnalyticsOverview, AnalyticsQuery, Category, CategoryCreate, CategoryUpdate, MessageResponse,
    Task, TaskCreate, TaskList, TaskPriority, TaskPriorityUpdate, TaskQuery, TaskStatus,
    TaskStatusUpdate, TaskUpdate,
};

/// What the resource layer stores: any decoded response, shared.
pub type Payload = dyn Any + Send + Sync;

// == Cache TTLs ==
/// Lifetime of each read family in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Task list pages change with every write
    pub task_list: Duration,
    pub task: Duration,
    /// Categories rarely change
    pub categories: Duration,
    pub analytics: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            task_list: Duration::from_secs(120),
            task: Duration::from_secs(300),
            categories: Duration::from_secs(600),
            analytics: Duration::from_secs(300),
        }
    }
}

/// Keys and key prefixes a successful write makes stale.
struct Invalidation<'a> {
    keys: Vec<CacheKey>,
    prefixes: &'a [&'a str],
}

// == Resource Client ==
pub struct ResourceClient {
    transport: Arc<dyn Transport>,
    cache: SharedCache<Payload>,
    ttls: CacheTtls,
    in_flight: InFlight,
}

impl ResourceClient {
    pub fn new(transport: Arc<dyn Transport>, cache: SharedCache<Payload>, ttls: CacheTtls) -> Self {
        Self {
            transport,
            cache,
            ttls,
            in_flight: InFlight::new(),
        }
    }

    /// The cache this client reads from and invalidates.
    pub fn cache(&self) -> &SharedCache<Payload> {
        &self.cache
    }

    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    // == Reads ==

    /// `GET /tasks` with pagination and filters.
    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Arc<TaskList>> {
        let request = ApiRequest::get("/tasks").with_query(query.to_query_pairs());
        self.cached_read(CacheKey::task_list(query), self.ttls.task_list, request)
            .await
    }

    /// `GET /tasks/{id}`.
    pub async fn get_task(&self, id: i64) -> Result<Arc<Task>> {
        let request = ApiRequest::get(format!("/tasks/{}", id));
        self.cached_read(CacheKey::task(id), self.ttls.task, request)
            .await
    }

    /// `GET /categories`.
    pub async fn list_categories(&self) -> Result<Arc<Vec<Category>>> {
        let request = ApiRequest::get("/categories");
        self.cached_read(CacheKey::categories(), self.ttls.categories, request)
            .await
    }

    /// `GET /analytics/overview?days=N`.
    pub async fn analytics_overview(&self, query: &AnalyticsQuery) -> Result<Arc<AnalyticsOverview>> {
        let request = ApiRequest::get("/analytics/overview")
            .with_query(vec![("days".to_string(), query.days.to_string())]);
        self.cached_read(CacheKey::analytics(query.days), self.ttls.analytics, request)
            .await
    }

    // == Task Writes ==

    pub async fn create_task(&self, task: &TaskCreate) -> Result<Task> {
        let request = ApiRequest::post("/tasks").with_json(task)?;
        self.write(
            request,
            Invalidation {
                keys: Vec::new(),
                prefixes: &[TASK_LIST_PREFIX, ANALYTICS_PREFIX],
            },
        )
        .await
    }

    pub async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Task> {
        let request = ApiRequest::put(format!("/tasks/{}", id)).with_json(update)?;
        self.write(request, task_changed(id)).await
    }

    pub async fn update_task_status(&self, id: i64, status: TaskStatus) -> Result<Task> {
        let request = ApiRequest::patch(format!("/tasks/{}/status", id))
            .with_json(&TaskStatusUpdate { status })?;
        self.write(request, task_changed(id)).await
    }

    pub async fn update_task_priority(&self, id: i64, priority: TaskPriority) -> Result<Task> {
        let request = ApiRequest::patch(format!("/tasks/{}/priority", id))
            .with_json(&TaskPriorityUpdate { priority })?;
        self.write(request, task_changed(id)).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<MessageResponse> {
        let request = ApiRequest::delete(format!("/tasks/{}", id));
        self.write(request, task_changed(id)).await
    }

    // == Category Writes ==

    pub async fn create_category(&self, category: &CategoryCreate) -> Result<Category> {
        let request = ApiRequest::post("/categories").with_json(category)?;
        self.write(
            request,
            Invalidation {
                keys: vec![CacheKey::categories()],
                prefixes: &[],
            },
        )
        .await
    }

    /// Tasks embed their category, so every cached task view goes too.
    pub async fn update_category(&self, id: i64, update: &CategoryUpdate) -> Result<Category> {
        let request = ApiRequest::put(format!("/categories/{}", id)).with_json(update)?;
        self.write(
            request,
            Invalidation {
                keys: vec![CacheKey::categories()],
                prefixes: &[TASK_LIST_PREFIX, TASK_PREFIX],
            },
        )
        .await
    }

    pub async fn delete_category(&self, id: i64) -> Result<MessageResponse> {
        let request = ApiRequest::delete(format!("/categories/{}", id));
        self.write(
            request,
            Invalidation {
                keys: vec![CacheKey::categories()],
                prefixes: &[TASK_LIST_PREFIX, TASK_PREFIX, ANALYTICS_PREFIX],
            },
        )
        .await
    }

    // == Cache Administration ==

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops every cached response. Returns how many entries were removed.
    pub fn clear_cache(&self) -> usize {
        let cleared = self.cache.clear();
        info!("Cleared {} cache entries", cleared);
        cleared
    }

    // == Internals ==

    async fn cached_read<T>(&self, key: CacheKey, ttl: Duration, request: ApiRequest) -> Result<Arc<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        if let Some(hit) = self.cache.get(key.as_str()).and_then(|v| downcast::<T>(&key, v)) {
            debug!("Cache hit: {}", key);
            return Ok(hit);
        }
        debug!("Cache miss: {}", key);

        let _slot = self.in_flight.acquire(key.as_str()).await;

        // Someone else may have fetched it while we waited
        if let Some(hit) = self.cache.peek(key.as_str()).and_then(|v| downcast::<T>(&key, v)) {
            debug!("Served {} from a concurrent fetch", key);
            return Ok(hit);
        }

        let generation = self.cache.generation();
        let body = self.transport.send(&request).await?;
        let value: Arc<T> = Arc::new(serde_json::from_value(body)?);

        let payload: Arc<Payload> = value.clone();
        if !self
            .cache
            .set_if_generation(key.as_str(), payload, ttl, generation)
        {
            debug!("Not caching {}: invalidated while in flight", key);
        }
        Ok(value)
    }

    async fn write<T>(&self, request: ApiRequest, invalidation: Invalidation<'_>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.transport.send(&request).await?;

        let keys: Vec<&str> = invalidation.keys.iter().map(CacheKey::as_str).collect();
        let removed = self.cache.invalidate(&keys, invalidation.prefixes);
        info!("{} succeeded, invalidated {} cache entries", request, removed);

        Ok(serde_json::from_value(body)?)
    }
}

/// A change to one task: its own entry, every list page and analytics.
fn task_changed(id: i64) -> Invalidation<'static> {
    Invalidation {
        keys: vec![CacheKey::task(id)],
        prefixes: &[TASK_LIST_PREFIX, ANALYTICS_PREFIX],
    }
}

fn downcast<T>(key: &CacheKey, value: Arc<Payload>) -> Option<Arc<T>>
where
    T: Send + Sync + 'static,
{
    match value.downcast::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Cached value under {} has an unexpected type, refetching", key);
            None
        }
    }
}
