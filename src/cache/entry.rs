//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::sync::Arc;
use std::time::Duration;

// == Cache Entry ==
/// A stored value plus the metadata needed to decide whether it is still live.
///
/// The value sits behind an `Arc`: every hit hands out the same allocation
/// until the key is overwritten.
#[derive(Debug)]
pub struct CacheEntry<V: ?Sized> {
    /// The stored value
    pub value: Arc<V>,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// Lifetime in milliseconds
    pub ttl_ms: u64,
}

impl<V: ?Sized> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            inserted_at: self.inserted_at,
            ttl_ms: self.ttl_ms,
        }
    }
}

impl<V: ?Sized> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped at `now_ms` that lives for `ttl`.
    pub fn new(value: Arc<V>, now_ms: u64, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: now_ms,
            ttl_ms: ttl.as_millis() as u64,
        }
    }

    // == Is Live ==
    /// Checks whether the entry is still live at `now_ms`.
    ///
    /// Live iff `now - inserted_at < ttl`, so an entry is dead the moment its
    /// full TTL has elapsed. A zero TTL is never live.
    pub fn is_live(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.inserted_at) < self.ttl_ms
    }

    // == Expires At ==
    /// Timestamp (Unix milliseconds) at which the entry stops being live.
    pub fn expires_at(&self) -> u64 {
        self.inserted_at.saturating_add(self.ttl_ms)
    }

    // == Time To Live ==
    /// Remaining lifetime at `now_ms`; zero once expired.
    pub fn ttl_remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.expires_at().saturating_sub(now_ms))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    fn entry(ttl: Duration) -> CacheEntry<str> {
        CacheEntry::new(Arc::from("value"), NOW, ttl)
    }

    #[test]
    fn test_entry_creation() {
        let entry = entry(Duration::from_secs(60));

        assert_eq!(&*entry.value, "value");
        assert_eq!(entry.inserted_at, NOW);
        assert_eq!(entry.ttl_ms, 60_000);
    }

    #[test]
    fn test_entry_live_before_ttl() {
        let entry = entry(Duration::from_secs(60));

        assert!(entry.is_live(NOW));
        assert!(entry.is_live(NOW + 59_999));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = entry(Duration::from_secs(60));

        // Dead exactly when the full TTL has elapsed
        assert!(!entry.is_live(NOW + 60_000));
        assert!(!entry.is_live(NOW + 120_000));
    }

    #[test]
    fn test_zero_ttl_never_live() {
        let entry = entry(Duration::ZERO);
        assert!(!entry.is_live(NOW));
    }

    #[test]
    fn test_clock_behind_insertion_is_live() {
        let entry = entry(Duration::from_secs(1));
        assert!(entry.is_live(NOW - 5_000));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = entry(Duration::from_secs(10));

        assert_eq!(entry.expires_at(), NOW + 10_000);
        assert_eq!(entry.ttl_remaining(NOW + 4_000), Duration::from_secs(6));
        assert_eq!(entry.ttl_remaining(NOW + 11_000), Duration::ZERO);
    }

    #[test]
    fn test_clone_shares_value() {
        let entry = entry(Duration::from_secs(10));
        let copy = entry.clone();

        assert!(Arc::ptr_eq(&entry.value, &copy.value));
    }
}
