//! API Module
//!
//! HTTP handlers and routing for the caching gateway in front of the
//! TaskFlow API.
//!
//! # Endpoints
//! - `/api/tasks`, `/api/tasks/:id` and its status/priority patches
//! - `/api/categories`, `/api/categories/:id`
//! - `GET /api/analytics/overview` - Analytics for a trailing window
//! - `GET /api/cache/stats`, `DELETE /api/cache/clear` - Cache administration
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
