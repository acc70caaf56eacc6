//! Domain entities and request/response models
//!
//! Domain types mirror the TaskFlow API schemas; request and response DTOs
//! are what the gateway accepts and produces.

pub mod domain;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use domain::{AnalyticsOverview, Category, Task, TaskList, TaskPriority, TaskStatus};
pub use requests::{
    AnalyticsQuery, CategoryCreate, CategoryUpdate, TaskCreate, TaskPriorityUpdate, TaskQuery,
    TaskStatusUpdate, TaskUpdate,
};
pub use responses::{
    CacheStatsResponse, ClearCacheResponse, ErrorResponse, HealthResponse, MessageResponse,
};
