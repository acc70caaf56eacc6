//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{delete, get, patch, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    analytics_overview_handler, cache_stats_handler, clear_cache_handler, create_category_handler,
    create_task_handler, delete_category_handler, delete_task_handler, get_task_handler,
    health_handler, list_categories_handler, list_tasks_handler, update_category_handler,
    update_task_handler, update_task_priority_handler, update_task_status_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|POST /api/tasks` - List (cached) or create tasks
/// - `GET|PUT|DELETE /api/tasks/:id` - One task (cached read)
/// - `PATCH /api/tasks/:id/status`, `PATCH /api/tasks/:id/priority`
/// - `GET|POST /api/categories` - List (cached) or create categories
/// - `PUT|DELETE /api/categories/:id`
/// - `GET /api/analytics/overview?days=N` - Analytics (cached)
/// - `GET /api/cache/stats`, `DELETE /api/cache/clear`
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/:id",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tasks/:id/status", patch(update_task_status_handler))
        .route("/tasks/:id/priority", patch(update_task_priority_handler))
        .route(
            "/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        .route(
            "/categories/:id",
            put(update_category_handler).delete(delete_category_handler),
        )
        .route("/analytics/overview", get(analytics_overview_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/clear", delete(clear_cache_handler));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
