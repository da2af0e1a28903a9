//! Snapshot Writer Module
//!
//! Applies encoded cache snapshots to storage. Writes are ordered by a
//! generation number so an older snapshot never replaces a newer one.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::cache::{Storage, STORAGE_KEY};

/// Cache state encoded under the store lock, waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub generation: u64,
    /// `None` empties the storage slot.
    pub payload: Option<String>,
}

// == Snapshot Writer ==
/// Cloneable handle; clones share the last applied generation.
#[derive(Clone)]
pub struct SnapshotWriter {
    storage: Arc<dyn Storage>,
    applied: Arc<Mutex<u64>>,
}

impl SnapshotWriter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            applied: Arc::new(Mutex::new(0)),
        }
    }

    // == Apply ==
    /// Writes `pending` unless a newer generation already landed.
    ///
    /// Blocks on storage I/O. Returns false when the write was skipped.
    pub fn apply(&self, pending: PendingWrite) -> bool {
        let mut applied = match self.applied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Snapshot writer lock poisoned, recovering");
                poisoned.into_inner()
            }
        };

        if pending.generation <= *applied {
            debug!(
                generation = pending.generation,
                applied = *applied,
                "Skipping stale cache snapshot"
            );
            return false;
        }

        let result = match &pending.payload {
            Some(raw) => self.storage.write(STORAGE_KEY, raw),
            None => self.storage.remove(STORAGE_KEY),
        };
        if let Err(err) = result {
            warn!(error = %err, "Could not persist image cache");
        }

        *applied = pending.generation;
        true
    }

    /// Runs [`apply`](Self::apply) on the blocking thread pool.
    pub async fn apply_in_background(&self, pending: PendingWrite) {
        let writer = self.clone();
        if let Err(err) = tokio::task::spawn_blocking(move || writer.apply(pending)).await {
            warn!(error = %err, "Cache snapshot write task failed");
        }
    }
}
