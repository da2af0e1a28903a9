//! Cache Module
//!
//! Downloaded image bodies kept in a bounded, expiring, persisted store.

mod clock;
mod entry;
mod manager;
mod order;
pub mod snapshot;
mod stats;
mod storage;
mod store;
mod writer;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CachedImage;
pub use manager::BlobCacheManager;
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{ImageCacheStore, STORAGE_KEY};
pub use writer::{PendingWrite, SnapshotWriter};

// == Public Constants ==
/// Default number of cached images.
pub const DEFAULT_CAPACITY: usize = 50;

/// Default lifetime of a cached image.
pub const DEFAULT_TTL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);
