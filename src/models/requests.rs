//! Request DTOs
//!
//! Bodies and query parameters accepted by the gateway and forwarded
//! upstream. Each type validates itself before anything leaves the process.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{TaskPriority, TaskStatus};

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const MAX_ANALYTICS_DAYS: u32 = 365;
pub const DEFAULT_CATEGORY_COLOR: &str = "#3498db";

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

fn default_days() -> u32 {
    30
}

fn default_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}

fn validate_title(title: &str) -> Option<String> {
    let len = title.chars().count();
    if len == 0 {
        return Some("Title cannot be empty".to_string());
    }
    if len > MAX_TITLE_LENGTH {
        return Some(format!(
            "Title exceeds maximum length of {} characters",
            MAX_TITLE_LENGTH
        ));
    }
    None
}

fn validate_category_name(name: &str) -> Option<String> {
    let len = name.chars().count();
    if len == 0 {
        return Some("Category name cannot be empty".to_string());
    }
    if len > MAX_CATEGORY_NAME_LENGTH {
        return Some(format!(
            "Category name exceeds maximum length of {} characters",
            MAX_CATEGORY_NAME_LENGTH
        ));
    }
    None
}

/// `#RRGGBB`
fn validate_color(color: &str) -> Option<String> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        None
    } else {
        Some(format!("Invalid color '{}', expected #RRGGBB", color))
    }
}

// == Task Query ==
/// Pagination and filters for listing tasks (`GET /tasks`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
            status: None,
            priority: None,
            category_id: None,
        }
    }
}

impl TaskQuery {
    /// Unfiltered query for one page.
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Present filters keyed by their query parameter name.
    pub fn filters(&self) -> BTreeMap<&'static str, Value> {
        let mut filters = BTreeMap::new();
        if let Some(status) = self.status {
            filters.insert("status", Value::from(status.as_str()));
        }
        if let Some(priority) = self.priority {
            filters.insert("priority", Value::from(priority.as_str()));
        }
        if let Some(category_id) = self.category_id {
            filters.insert("category_id", Value::from(category_id));
        }
        filters
    }

    /// Query string pairs in the upstream's parameter names.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority".to_string(), priority.to_string()));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(("category_id".to_string(), category_id.to_string()));
        }
        pairs
    }

    pub fn validate(&self) -> Option<String> {
        if self.page == 0 {
            return Some("Page must be at least 1".to_string());
        }
        if self.size == 0 || self.size > MAX_PAGE_SIZE {
            return Some(format!("Size must be between 1 and {}", MAX_PAGE_SIZE));
        }
        None
    }
}

// == Analytics Query ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

impl Default for AnalyticsQuery {
    fn default() -> Self {
        Self {
            days: default_days(),
        }
    }
}

impl AnalyticsQuery {
    pub fn validate(&self) -> Option<String> {
        if self.days == 0 || self.days > MAX_ANALYTICS_DAYS {
            return Some(format!("Days must be between 1 and {}", MAX_ANALYTICS_DAYS));
        }
        None
    }
}

// == Task Bodies ==
/// Body for `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

impl TaskCreate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            category_id: None,
        }
    }

    pub fn validate(&self) -> Option<String> {
        validate_title(&self.title)
    }
}

/// Body for `PUT /tasks/{id}`. Absent fields are left unchanged upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

impl TaskUpdate {
    pub fn validate(&self) -> Option<String> {
        self.title.as_deref().and_then(validate_title)
    }
}

/// Body for `PATCH /tasks/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
}

/// Body for `PATCH /tasks/{id}/priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPriorityUpdate {
    pub priority: TaskPriority,
}

// == Category Bodies ==
/// Body for `POST /categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

impl CategoryCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: default_color(),
        }
    }

    pub fn validate(&self) -> Option<String> {
        validate_category_name(&self.name).or_else(|| validate_color(&self.color))
    }
}

/// Body for `PUT /categories/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CategoryUpdate {
    pub fn validate(&self) -> Option<String> {
        self.name
            .as_deref()
            .and_then(validate_category_name)
            .or_else(|| self.color.as_deref().and_then(validate_color))
    }
}
