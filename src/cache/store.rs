//! Cache Store Module
//!
//! Main cache engine: a HashMap of TTL-stamped entries with lazy expiry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};

// == Cache Store ==
/// Key-value storage where every entry carries its own TTL.
///
/// Expiry is lazy: a dead entry stays in the map, and is counted by
/// [`len`](Self::len), until it is looked up or swept by
/// [`clear_expired`](Self::clear_expired).
pub struct CacheStore<V: ?Sized> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Lookup counters
    stats: CacheStats,
    /// Bumped by every invalidation and clear
    generation: u64,
    /// Time source for stamping and expiry
    clock: Arc<dyn Clock>,
}

impl<V: ?Sized> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .field("stats", &self.stats)
            .field("generation", &self.generation)
            .field("clock", &self.clock)
            .finish()
    }
}

impl<V: ?Sized> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: ?Sized> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            generation: 0,
            clock,
        }
    }

    // == Set ==
    /// Stores a value under `key` for `ttl`, stamping the current time.
    ///
    /// Overwriting an existing key replaces its value and restarts its TTL.
    pub fn set(&mut self, key: impl Into<String>, value: Arc<V>, ttl: Duration) {
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);
        self.entries.insert(key.into(), entry);
    }

    // == Set If Generation ==
    /// Stores a value only if no invalidation happened since `generation`
    /// was read from [`generation`](Self::generation).
    ///
    /// Returns whether the value was stored.
    pub fn set_if_generation(
        &mut self,
        key: impl Into<String>,
        value: Arc<V>,
        ttl: Duration,
        generation: u64,
    ) -> bool {
        if self.generation != generation {
            return false;
        }
        self.set(key, value, ttl);
        true
    }

    // == Get ==
    /// Retrieves the live value under `key`.
    ///
    /// A missing or expired key counts as a miss; an expired entry is removed
    /// on the way out. A live one counts as a hit.
    pub fn get(&mut self, key: &str) -> Option<Arc<V>> {
        match self.live_value(key) {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Like [`get`](Self::get) but leaves the hit/miss counters alone.
    pub fn peek(&mut self, key: &str) -> Option<Arc<V>> {
        self.live_value(key)
    }

    // == Has ==
    /// Checks for a live entry without touching the hit/miss counters.
    ///
    /// Expired entries are still removed.
    pub fn has(&mut self, key: &str) -> bool {
        self.live_value(key).is_some()
    }

    // == TTL ==
    /// Remaining lifetime of the live entry under `key`.
    ///
    /// Leaves the hit/miss counters alone; an expired entry is removed.
    pub fn ttl(&mut self, key: &str) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.live_entry(key, now)
            .map(|entry| entry.ttl_remaining(now))
    }

    // == Extend TTL ==
    /// Gives the live entry under `key` a fresh lifetime of `ttl` starting
    /// now. Returns false if there is no live entry.
    pub fn extend_ttl(&mut self, key: &str, ttl: Duration) -> bool {
        let now = self.clock.now_ms();
        match self.live_entry(key, now) {
            Some(entry) => {
                *entry = CacheEntry::new(Arc::clone(&entry.value), now, ttl);
                true
            }
            None => false,
        }
    }

    // == Delete ==
    /// Removes an entry by key, returning whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Delete Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn delete_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    // == Invalidate ==
    /// Removes the exact `keys` and everything under `prefixes`, and bumps
    /// the generation so in-flight fetches cannot repopulate stale data.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, keys: &[&str], prefixes: &[&str]) -> usize {
        let mut removed = keys.iter().filter(|key| self.delete(key)).count();
        for prefix in prefixes {
            removed += self.delete_prefix(prefix);
        }
        self.generation += 1;
        removed
    }

    // == Clear Expired ==
    /// Removes all expired entries as of now.
    ///
    /// Returns the number of entries removed.
    pub fn clear_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before - self.entries.len()
    }

    // == Clear ==
    /// Removes every entry. Hit/miss counters are kept.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.generation += 1;
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats;
        stats.set_size(self.entries.len());
        stats
    }

    // == Generation ==
    /// Current invalidation generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live value lookup shared by get/peek/has.
    fn live_value(&mut self, key: &str) -> Option<Arc<V>> {
        let now = self.clock.now_ms();
        self.live_entry(key, now)
            .map(|entry| Arc::clone(&entry.value))
    }

    /// The entry under `key` if live at `now`; drops it if expired.
    fn live_entry(&mut self, key: &str, now: u64) -> Option<&mut CacheEntry<V>> {
        if !self.entries.get(key)?.is_live(now) {
            self.entries.remove(key);
            return None;
        }
        self.entries.get_mut(key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const MINUTE: Duration = Duration::from_secs(60);

    fn store() -> (CacheStore<String>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let store = CacheStore::with_clock(Arc::new(clock.clone()));
        (store, clock)
    }

    fn value(s: &str) -> Arc<String> {
        Arc::new(s.to_string())
    }

    #[test]
    fn test_store_new() {
        let (store, _) = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_store_set_and_get() {
        let (mut store, _) = store();

        store.set("key1", value("value1"), MINUTE);

        assert_eq!(store.get("key1").as_deref(), Some(&"value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_returns_same_allocation() {
        let (mut store, _) = store();
        let stored = value("shared");

        store.set("key", Arc::clone(&stored), MINUTE);
        let first = store.get("key").unwrap();
        let second = store.get("key").unwrap();

        assert!(Arc::ptr_eq(&stored, &first));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_store_get_nonexistent_counts_miss() {
        let (mut store, _) = store();

        assert!(store.get("nonexistent").is_none());

        let stats = store.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_has_does_not_touch_counters() {
        let (mut store, _) = store();
        store.set("key", value("v"), MINUTE);

        assert!(store.has("key"));
        assert!(!store.has("other"));

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_peek_does_not_touch_counters() {
        let (mut store, clock) = store();
        store.set("key", value("v"), MINUTE);

        assert!(store.peek("key").is_some());
        clock.advance(MINUTE);
        assert!(store.peek("key").is_none());

        let stats = store.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (0, 0, 0));
    }

    #[test]
    fn test_store_delete() {
        let (mut store, _) = store();
        store.set("key1", value("value1"), MINUTE);

        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_ttl_reports_remaining_lifetime() {
        let (mut store, clock) = store();
        store.set("key1", value("value1"), MINUTE);
        clock.advance(Duration::from_secs(20));

        assert_eq!(store.ttl("key1"), Some(Duration::from_secs(40)));
        assert_eq!(store.ttl("missing"), None);

        let stats = store.stats();
        assert_eq!((stats.hits, stats.misses), (0, 0));
    }

    #[test]
    fn test_ttl_of_expired_entry_removes_it() {
        let (mut store, clock) = store();
        store.set("key1", value("value1"), MINUTE);
        clock.advance(MINUTE);

        assert_eq!(store.ttl("key1"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_extend_ttl() {
        let (mut store, clock) = store();
        store.set("key1", value("value1"), MINUTE);
        clock.advance(Duration::from_secs(50));

        assert!(store.extend_ttl("key1", Duration::from_secs(30)));
        assert_eq!(store.ttl("key1"), Some(Duration::from_secs(30)));

        clock.advance(Duration::from_secs(29));
        assert!(store.has("key1"), "lifetime restarted from the extension");
        clock.advance(Duration::from_secs(1));
        assert!(!store.has("key1"));

        assert!(!store.extend_ttl("key1", MINUTE), "expired entries cannot be revived");
        assert!(!store.extend_ttl("missing", MINUTE));
    }

    #[test]
    fn test_store_overwrite_restarts_ttl() {
        let (mut store, clock) = store();

        store.set("key1", value("value1"), MINUTE);
        clock.advance(Duration::from_secs(50));
        store.set("key1", value("value2"), MINUTE);
        clock.advance(Duration::from_secs(50));

        assert_eq!(store.get("key1").as_deref(), Some(&"value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let (mut store, clock) = store();
        store.set("key1", value("value1"), Duration::from_secs(1));

        assert!(store.get("key1").is_some());

        clock.advance(Duration::from_secs(1));

        assert!(store.get("key1").is_none());
        assert_eq!(store.len(), 0, "expired entry removed on access");
        let stats = store.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn test_has_evicts_expired() {
        let (mut store, clock) = store();
        store.set("key", value("v"), Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));

        assert_eq!(store.len(), 1, "expired entries linger until touched");
        assert!(!store.has("key"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let (mut store, clock) = store();

        store.set("key1", value("value1"), Duration::from_secs(1));
        store.set("key2", value("value2"), Duration::from_secs(10));
        clock.advance(Duration::from_secs(5));

        assert_eq!(store.clear_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.has("key2"));
    }

    #[test]
    fn test_clear_keeps_counters() {
        let (mut store, _) = store();
        store.set("a", value("1"), MINUTE);
        store.set("b", value("2"), MINUTE);
        store.get("a");
        store.get("missing");

        assert_eq!(store.clear(), 2);

        let stats = store.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!(!store.has("a"));
        assert!(!store.has("b"));
    }

    #[test]
    fn test_delete_prefix() {
        let (mut store, _) = store();
        store.set("tasks_1_10_{}", value("page1"), MINUTE);
        store.set("tasks_2_10_{}", value("page2"), MINUTE);
        store.set("task_7", value("task"), MINUTE);
        store.set("categories", value("cats"), MINUTE);

        assert_eq!(store.delete_prefix("tasks_"), 2);
        assert!(store.has("task_7"));
        assert!(store.has("categories"));
    }

    #[test]
    fn test_invalidate_bumps_generation() {
        let (mut store, _) = store();
        store.set("task_1", value("t"), MINUTE);
        store.set("tasks_1_10_{}", value("l"), MINUTE);
        store.set("categories", value("c"), MINUTE);

        let removed = store.invalidate(&["task_1", "task_2"], &["tasks_"]);

        assert_eq!(removed, 2);
        assert_eq!(store.generation(), 1);
        assert!(store.has("categories"));
    }

    #[test]
    fn test_set_if_generation() {
        let (mut store, _) = store();
        let generation = store.generation();

        store.invalidate(&[], &["tasks_"]);

        assert!(!store.set_if_generation("tasks_1_10_{}", value("stale"), MINUTE, generation));
        assert!(store.is_empty());
        assert!(store.set_if_generation("tasks_1_10_{}", value("fresh"), MINUTE, store.generation()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_different_ttls_expire_independently() {
        let (mut store, clock) = store();
        store.set("tasks_1_10_{}", value("list"), Duration::from_secs(120));
        store.set("categories", value("cats"), Duration::from_secs(600));

        clock.advance(Duration::from_secs(120));
        assert!(!store.has("tasks_1_10_{}"));
        assert!(store.has("categories"));

        clock.advance(Duration::from_secs(480));
        assert!(!store.has("categories"));
    }

    #[test]
    fn test_unsized_values() {
        let mut store: CacheStore<str> = CacheStore::new();
        store.set("greeting", Arc::from("hello"), MINUTE);
        assert_eq!(store.get("greeting").as_deref(), Some("hello"));
    }
}
