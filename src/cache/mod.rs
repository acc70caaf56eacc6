//! Cache Module
//!
//! In-memory key-value cache with per-entry TTL and lazy expiry.

mod clock;
mod entry;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::CacheStore;
