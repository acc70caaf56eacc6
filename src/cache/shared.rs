//! Shared Cache Module
//!
//! Thread-safe handle over a [`CacheStore`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{CacheStats, CacheStore, Clock};

// == Shared Cache ==
/// Cloneable handle to one cache shared by every call site.
///
/// Each method takes the lock for exactly one store operation, so a
/// multi-key [`invalidate`](Self::invalidate) is never observed half done.
/// The lock is synchronous and never held across an `.await`.
pub struct SharedCache<V: ?Sized> {
    inner: Arc<Mutex<CacheStore<V>>>,
}

impl<V: ?Sized> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: ?Sized> fmt::Debug for SharedCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedCache").field(&*self.inner.lock()).finish()
    }
}

impl<V: ?Sized> Default for SharedCache<V> {
    fn default() -> Self {
        Self::new(CacheStore::new())
    }
}

impl<V: ?Sized> SharedCache<V> {
    /// Wraps an existing store.
    pub fn new(store: CacheStore<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Creates an empty shared cache on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::new(CacheStore::with_clock(clock))
    }

    pub fn set(&self, key: impl Into<String>, value: Arc<V>, ttl: Duration) {
        self.inner.lock().set(key, value, ttl);
    }

    pub fn set_if_generation(
        &self,
        key: impl Into<String>,
        value: Arc<V>,
        ttl: Duration,
        generation: u64,
    ) -> bool {
        self.inner
            .lock()
            .set_if_generation(key, value, ttl, generation)
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.inner.lock().get(key)
    }

    pub fn peek(&self, key: &str) -> Option<Arc<V>> {
        self.inner.lock().peek(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.lock().has(key)
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.inner.lock().ttl(key)
    }

    pub fn extend_ttl(&self, key: &str, ttl: Duration) -> bool {
        self.inner.lock().extend_ttl(key, ttl)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().delete(key)
    }

    pub fn delete_prefix(&self, prefix: &str) -> usize {
        self.inner.lock().delete_prefix(prefix)
    }

    pub fn invalidate(&self, keys: &[&str], prefixes: &[&str]) -> usize {
        self.inner.lock().invalidate(keys, prefixes)
    }

    pub fn clear_expired(&self) -> usize {
        self.inner.lock().clear_expired()
    }

    pub fn clear(&self) -> usize {
        self.inner.lock().clear()
    }

    pub fn size(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation()
    }
}
