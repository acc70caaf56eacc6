//! Cache Key Construction
//!
//! Keys are `<family>_<integer parts>_<filters as JSON>`. Positional parts
//! are integers and the filter object is JSON with sorted keys, so values
//! can never smuggle a delimiter and equal parameters always give equal keys.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::models::TaskQuery;

/// Prefix shared by every cached task list page.
pub const TASK_LIST_PREFIX: &str = "tasks_";
/// Prefix shared by every cached single task.
pub const TASK_PREFIX: &str = "task_";
/// Prefix shared by every cached analytics overview.
pub const ANALYTICS_PREFIX: &str = "analytics_";
/// The category collection is cached under one key.
pub const CATEGORIES_KEY: &str = "categories";

// == Cache Key ==
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds a key from a family name, positional integer parts and a
    /// filter map. Filters are rendered as a JSON object in key order.
    pub fn compose<K>(family: &str, parts: &[u64], filters: &BTreeMap<K, Value>) -> Self
    where
        K: AsRef<str> + Ord,
    {
        let mut key = String::from(family);
        for part in parts {
            key.push('_');
            key.push_str(&part.to_string());
        }
        key.push('_');
        key.push_str(&canonical_json(filters));
        Self(key)
    }

    /// Key of one task list page, e.g. `tasks_1_10_{}`.
    pub fn task_list(query: &TaskQuery) -> Self {
        Self::compose(
            "tasks",
            &[u64::from(query.page), u64::from(query.size)],
            &query.filters(),
        )
    }

    /// Key of one task, e.g. `task_42`.
    pub fn task(id: i64) -> Self {
        Self(format!("{}{}", TASK_PREFIX, id))
    }

    pub fn categories() -> Self {
        Self(CATEGORIES_KEY.to_string())
    }

    /// Key of the analytics overview for a trailing window, e.g. `analytics_30`.
    pub fn analytics(days: u32) -> Self {
        Self(format!("{}{}", ANALYTICS_PREFIX, days))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON object text with keys in map order; each key and value is JSON
/// encoded so quotes, commas and underscores inside them stay escaped.
fn canonical_json<K>(filters: &BTreeMap<K, Value>) -> String
where
    K: AsRef<str> + Ord,
{
    let mut out = String::from("{");
    for (i, (name, value)) in filters.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::from(name.as_ref()).to_string());
        out.push(':');
        out.push_str(&value.to_string());
    }
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus};
    use proptest::prelude::*;

    fn filters(pairs: &[(&str, &str)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_unfiltered_first_page() {
        let key = CacheKey::task_list(&TaskQuery::default());
        assert_eq!(key.as_str(), "tasks_1_10_{}");
    }

    #[test]
    fn test_filtered_page() {
        let query = TaskQuery::page(2, 25)
            .with_status(TaskStatus::Todo)
            .with_priority(TaskPriority::High)
            .with_category(3);

        assert_eq!(
            CacheKey::task_list(&query).as_str(),
            r#"tasks_2_25_{"category_id":3,"priority":"high","status":"todo"}"#
        );
    }

    #[test]
    fn test_filter_order_does_not_matter() {
        let a = filters(&[("status", "todo"), ("priority", "low")]);
        let b = filters(&[("priority", "low"), ("status", "todo")]);

        assert_eq!(
            CacheKey::compose("tasks", &[1, 10], &a),
            CacheKey::compose("tasks", &[1, 10], &b)
        );
    }

    #[test]
    fn test_trailing_space_is_a_different_filter() {
        let a = CacheKey::compose("tasks", &[1, 10], &filters(&[("status", "todo")]));
        let b = CacheKey::compose("tasks", &[1, 10], &filters(&[("status", "todo ")]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_delimiters_inside_values_do_not_collide() {
        // Naive "k:v,k:v" joining would render both of these the same way
        let a = filters(&[("status", "todo\",\"priority\":\"low")]);
        let b = filters(&[("status", "todo"), ("priority", "low")]);

        assert_ne!(
            CacheKey::compose("tasks", &[1, 10], &a),
            CacheKey::compose("tasks", &[1, 10], &b)
        );
    }

    #[test]
    fn test_family_prefixes() {
        let list = CacheKey::task_list(&TaskQuery::default());
        let task = CacheKey::task(5);

        assert!(list.as_str().starts_with(TASK_LIST_PREFIX));
        assert!(!list.as_str().starts_with(TASK_PREFIX));
        assert!(task.as_str().starts_with(TASK_PREFIX));
        assert!(!task.as_str().starts_with(TASK_LIST_PREFIX));
        assert_eq!(CacheKey::analytics(30).as_str(), "analytics_30");
        assert_eq!(CacheKey::categories().as_str(), CATEGORIES_KEY);
    }

    proptest! {
        // Distinct filter maps never share a key.
        #[test]
        fn prop_distinct_filters_distinct_keys(
            a in prop::collection::btree_map("[a-z_,:\"{} ]{1,6}", "[a-z_,:\"{} ]{0,6}", 0..4),
            b in prop::collection::btree_map("[a-z_,:\"{} ]{1,6}", "[a-z_,:\"{} ]{0,6}", 0..4),
        ) {
            let to_values = |m: &BTreeMap<String, String>| -> BTreeMap<String, Value> {
                m.iter().map(|(k, v)| (k.clone(), Value::from(v.as_str()))).collect()
            };
            let key_a = CacheKey::compose("tasks", &[1, 10], &to_values(&a));
            let key_b = CacheKey::compose("tasks", &[1, 10], &to_values(&b));
            prop_assert_eq!(a == b, key_a == key_b);
        }

        // Distinct pages never share a key.
        #[test]
        fn prop_distinct_pages_distinct_keys(p1 in 1u32..1000, s1 in 1u32..101, p2 in 1u32..1000, s2 in 1u32..101) {
            let a = CacheKey::task_list(&TaskQuery::page(p1, s1));
            let b = CacheKey::task_list(&TaskQuery::page(p2, s2));
            prop_assert_eq!((p1, s1) == (p2, s2), a == b);
        }
    }
}
