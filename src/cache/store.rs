//! Image Cache Store Module
//!
//! Bounded map from source URL to downloaded image, with expiry and
//! insertion-order eviction. Mutations are captured as pending snapshots
//! that the caller writes out once the store is no longer locked.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::cache::{
    snapshot, CacheStats, CachedImage, Clock, InsertionOrder, MemoryStorage, PendingWrite,
    SnapshotWriter, Storage, SystemClock,
};

/// Storage slot holding the serialized cache.
pub const STORAGE_KEY: &str = "tapalque.image_cache";

// == Image Cache Store ==
/// Cache storage with FIFO eviction and TTL support.
///
/// Invariants held after every public method returns:
/// - at most one entry per URL
/// - `len() <= capacity()`
///
/// Eviction follows insertion order, which is also the order entries are
/// persisted and restored in. With a clock that never steps backwards
/// this is the same as oldest `created_at` first.
///
/// The storage slot matches the live entries once the pending snapshot
/// from [`take_pending`](Self::take_pending) has been applied.
pub struct ImageCacheStore {
    entries: HashMap<String, CachedImage>,
    order: InsertionOrder,
    stats: CacheStats,
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    storage: Arc<dyn Storage>,
    writer: SnapshotWriter,
    generation: u64,
    dirty: bool,
}

impl std::fmt::Debug for ImageCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCacheStore")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ImageCacheStore {
    // == Constructor ==
    /// Opens a store, restoring whatever the storage slot holds.
    ///
    /// A missing, unreadable or foreign-version snapshot yields an empty
    /// store. Restored entries that are already expired are purged before
    /// this returns. A capacity of 0 is treated as 1.
    pub fn open(
        capacity: usize,
        ttl: Duration,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut store = Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            capacity: capacity.max(1),
            ttl,
            clock,
            writer: SnapshotWriter::new(storage.clone()),
            storage,
            generation: 0,
            dirty: false,
        };
        store.restore();
        store
    }

    /// Store backed by process memory and the system clock.
    pub fn in_memory(capacity: usize, ttl: Duration) -> Self {
        Self::open(
            capacity,
            ttl,
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock),
        )
    }

    fn restore(&mut self) {
        let raw = match self.storage.read(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, "Could not read persisted image cache, starting empty");
                return;
            }
        };

        let images = snapshot::decode(&raw);
        let decoded = images.len();

        for image in images {
            self.order.push(&image.source_url);
            self.entries.insert(image.source_url.clone(), image);
        }
        let evicted = self.enforce_capacity();
        let purged = self.remove_expired();

        self.stats.set_total_entries(self.entries.len());
        info!(
            restored = self.entries.len(),
            evicted, purged, "Restored image cache from storage"
        );

        if self.entries.len() != decoded {
            self.dirty = true;
            self.flush();
        }
    }

    // == Get ==
    /// Returns the content for `url` if a live entry exists.
    ///
    /// An expired entry is removed (and a snapshot queued) before the miss
    /// is reported. Reads never change eviction order.
    pub fn get(&mut self, url: &str) -> Option<Bytes> {
        let now = self.clock.now_ms();

        let live = self
            .entries
            .get(url)
            .map(|entry| (!entry.is_expired_at(now)).then(|| entry.content.clone()));

        match live {
            Some(Some(content)) => {
                self.stats.record_hit();
                Some(content)
            }
            Some(None) => {
                self.entries.remove(url);
                self.order.remove(url);
                self.stats.record_expired(1);
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                debug!(url, "Cached image expired");
                self.dirty = true;
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// True if a live entry exists. Does not touch statistics.
    pub fn contains(&self, url: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(url)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Insert ==
    /// Stores `content` for `url`, replacing any previous entry.
    ///
    /// If the store then holds more than `capacity` entries, the earliest
    /// inserted ones are evicted, whether or not they expired.
    pub fn insert(&mut self, url: &str, content: Bytes) {
        let image = CachedImage::new(url, content, self.clock.now_ms(), self.ttl);

        self.entries.insert(url.to_string(), image);
        self.order.push(url);
        self.enforce_capacity();

        self.stats.set_total_entries(self.entries.len());
        self.dirty = true;
    }

    fn enforce_capacity(&mut self) -> usize {
        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_oldest() else {
                break;
            };
            if self.entries.remove(&oldest).is_some() {
                self.stats.record_eviction();
                evicted += 1;
                debug!(url = %oldest, "Evicted cached image");
            }
        }
        evicted
    }

    // == Purge Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let removed = self.remove_expired();
        if removed > 0 {
            self.stats.set_total_entries(self.entries.len());
            self.dirty = true;
        }
        removed
    }

    fn remove_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(url, _)| url.clone())
            .collect();

        for url in &expired {
            self.entries.remove(url);
            self.order.remove(url);
        }

        self.stats.record_expired(expired.len());
        expired.len()
    }

    // == Clear ==
    /// Drops every entry. The pending snapshot empties the storage slot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
        self.dirty = true;
    }

    // == Persistence ==
    /// Encodes the live entries, oldest first, if anything changed since
    /// the last call.
    ///
    /// Does no I/O. An empty cache yields a snapshot that clears the slot.
    pub fn take_pending(&mut self) -> Option<PendingWrite> {
        if !self.dirty {
            return None;
        }

        let now = self.clock.now_ms();
        let live: Vec<&CachedImage> = self
            .order
            .oldest_first()
            .filter_map(|url| self.entries.get(url))
            .filter(|entry| !entry.is_expired_at(now))
            .collect();

        let payload = if live.is_empty() {
            None
        } else {
            match snapshot::encode(live) {
                Ok(encoded) => Some(encoded),
                Err(err) => {
                    warn!(error = %err, "Could not serialize image cache");
                    return None;
                }
            }
        };

        self.dirty = false;
        self.generation += 1;
        Some(PendingWrite {
            generation: self.generation,
            payload,
        })
    }

    /// Writes any pending snapshot on the calling thread.
    ///
    /// Failures are logged and otherwise ignored; the in-memory state stays
    /// authoritative.
    pub fn flush(&mut self) {
        if let Some(pending) = self.take_pending() {
            self.writer.apply(pending);
        }
    }

    /// Handle that applies this store's pending snapshots.
    pub fn writer(&self) -> SnapshotWriter {
        self.writer.clone()
    }

    pub fn record_fetch_failure(&mut self) {
        self.stats.record_fetch_failure();
    }

    // == Accessors ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Cached URLs from oldest to newest.
    pub fn urls(&self) -> Vec<String> {
        self.order.oldest_first().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
