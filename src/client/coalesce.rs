//! Per-key In-flight Tracking
//!
//! Serializes concurrent fetches of the same cache key so only one of them
//! reaches the network at a time.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

// == In Flight ==
#[derive(Debug, Default)]
pub struct InFlight {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds `key`, then holds it until the
    /// returned guard is dropped.
    ///
    /// The guard exists before the wait starts, so a caller cancelled while
    /// queued still releases its claim on the slot.
    pub async fn acquire(&self, key: &str) -> InFlightGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        let mut guard = InFlightGuard {
            owner: self,
            key: key.to_string(),
            slot,
            permit: None,
        };
        // Declared after `guard`, so a cancelled wait drops it first
        let queued = Arc::clone(&guard.slot).lock_owned();
        guard.permit = Some(queued.await);
        guard
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

// == In Flight Guard ==
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    key: String,
    slot: Arc<AsyncMutex<()>>,
    /// `None` while still queued behind another holder
    permit: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.owner.slots.lock();
        drop(self.permit.take());

        // Map + this guard are the only owners: nobody holds or waits
        let ours = slots
            .get(&self.key)
            .is_some_and(|slot| Arc::ptr_eq(slot, &self.slot));
        if ours && Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.key);
        }
    }
}
