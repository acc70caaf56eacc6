//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint. Reads go through the
//! resource client's cache; writes are forwarded upstream and invalidate it.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::SharedCache;
use crate::client::{HttpTransport, ResourceClient, RetryTransport, Transport};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    AnalyticsOverview, AnalyticsQuery, CacheStatsResponse, Category, CategoryCreate,
    CategoryUpdate, ClearCacheResponse, HealthResponse, MessageResponse, Task, TaskCreate,
    TaskList, TaskPriorityUpdate, TaskQuery, TaskStatusUpdate, TaskUpdate,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ResourceClient>,
}

impl AppState {
    pub fn new(client: ResourceClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Builds the upstream transport stack and an empty cache from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut http = HttpTransport::new(config.api_url.as_str(), config.request_timeout())?;
        if let Some(token) = &config.api_token {
            http = http.with_token(token.as_str());
        }
        let transport: Arc<dyn Transport> =
            Arc::new(RetryTransport::new(Arc::new(http), config.retry_policy()));

        Ok(Self::new(ResourceClient::new(
            transport,
            SharedCache::default(),
            config.cache_ttls(),
        )))
    }
}

fn check(problem: Option<String>) -> Result<()> {
    match problem {
        Some(message) => Err(ApiError::Validation(message)),
        None => Ok(()),
    }
}

// == Tasks ==

/// GET /api/tasks
pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Arc<TaskList>>> {
    check(query.validate())?;
    Ok(Json(state.client.list_tasks(&query).await?))
}

/// GET /api/tasks/:id
pub async fn get_task_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Arc<Task>>> {
    Ok(Json(state.client.get_task(id).await?))
}

/// POST /api/tasks
pub async fn create_task_handler(
    State(state): State<AppState>,
    Json(req): Json<TaskCreate>,
) -> Result<Json<Task>> {
    check(req.validate())?;
    Ok(Json(state.client.create_task(&req).await?))
}

/// PUT /api/tasks/:id
pub async fn update_task_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TaskUpdate>,
) -> Result<Json<Task>> {
    check(req.validate())?;
    Ok(Json(state.client.update_task(id, &req).await?))
}

/// PATCH /api/tasks/:id/status
pub async fn update_task_status_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TaskStatusUpdate>,
) -> Result<Json<Task>> {
    Ok(Json(state.client.update_task_status(id, req.status).await?))
}

/// PATCH /api/tasks/:id/priority
pub async fn update_task_priority_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TaskPriorityUpdate>,
) -> Result<Json<Task>> {
    Ok(Json(
        state.client.update_task_priority(id, req.priority).await?,
    ))
}

/// DELETE /api/tasks/:id
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    Ok(Json(state.client.delete_task(id).await?))
}

// == Categories ==

/// GET /api/categories
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> Result<Json<Arc<Vec<Category>>>> {
    Ok(Json(state.client.list_categories().await?))
}

/// POST /api/categories
pub async fn create_category_handler(
    State(state): State<AppState>,
    Json(req): Json<CategoryCreate>,
) -> Result<Json<Category>> {
    check(req.validate())?;
    Ok(Json(state.client.create_category(&req).await?))
}

/// PUT /api/categories/:id
pub async fn update_category_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CategoryUpdate>,
) -> Result<Json<Category>> {
    check(req.validate())?;
    Ok(Json(state.client.update_category(id, &req).await?))
}

/// DELETE /api/categories/:id
pub async fn delete_category_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    Ok(Json(state.client.delete_category(id).await?))
}

// == Analytics ==

/// GET /api/analytics/overview
pub async fn analytics_overview_handler(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<Arc<AnalyticsOverview>>> {
    check(query.validate())?;
    Ok(Json(state.client.analytics_overview(&query).await?))
}

// == Cache Administration ==

/// GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(state.client.cache_stats().into())
}

/// DELETE /api/cache/clear
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    Json(ClearCacheResponse::new(state.client.clear_cache()))
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
