//! Blob Cache Manager
//!
//! Shared handle combining the cache store with the network fetcher.
//! Every failure is absorbed here: callers see `None`, never an error.
//! Snapshots are written after the store lock is released, on the
//! blocking thread pool.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, ImageCacheStore, SnapshotWriter};
use crate::fetch::ImageFetcher;

// == Blob Cache Manager ==
/// Cloneable handle; clones share one store and one fetcher.
#[derive(Clone)]
pub struct BlobCacheManager {
    store: Arc<RwLock<ImageCacheStore>>,
    writer: SnapshotWriter,
    fetcher: Arc<dyn ImageFetcher>,
}

impl BlobCacheManager {
    pub fn new(store: ImageCacheStore, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            writer: store.writer(),
            store: Arc::new(RwLock::new(store)),
            fetcher,
        }
    }

    /// Runs `op` under the write lock, then persists whatever it changed
    /// once the lock is dropped.
    async fn mutate<T>(&self, op: impl FnOnce(&mut ImageCacheStore) -> T) -> T {
        let (out, pending) = {
            let mut store = self.store.write().await;
            let out = op(&mut store);
            (out, store.take_pending())
        };

        if let Some(pending) = pending {
            self.writer.apply_in_background(pending).await;
        }
        out
    }

    // == Fetch And Cache ==
    /// Returns live cached content, or downloads and caches it.
    ///
    /// A failed download leaves the cache untouched and returns None. The
    /// store lock is not held while the download is in flight.
    pub async fn fetch_and_cache(&self, url: &str) -> Option<Bytes> {
        if let Some(content) = self.mutate(|store| store.get(url)).await {
            debug!(url, "Image served from cache");
            return Some(content);
        }

        match self.fetcher.fetch(url).await {
            Ok(content) => {
                self.mutate(|store| store.insert(url, content.clone())).await;
                debug!(url, bytes = content.len(), "Image cached");
                Some(content)
            }
            Err(err) => {
                warn!(url, error = %err, "Image download failed");
                self.store.write().await.record_fetch_failure();
                None
            }
        }
    }

    // == Peek ==
    /// Returns live cached content without any network I/O.
    pub async fn peek(&self, url: &str) -> Option<Bytes> {
        self.mutate(|store| store.get(url)).await
    }

    // == Preload ==
    /// Fetches every URL concurrently, best effort.
    ///
    /// Completion order is unspecified and failures do not stop the batch.
    /// Returns the number of URLs that ended up cached.
    pub async fn preload<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tasks = JoinSet::new();
        for url in urls {
            let url = url.into();
            let manager = self.clone();
            tasks.spawn(async move { manager.fetch_and_cache(&url).await.is_some() });
        }

        let requested = tasks.len();
        let mut cached = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => cached += 1,
                Ok(false) => {}
                Err(err) => warn!(error = %err, "Preload task failed"),
            }
        }

        info!(requested, cached, "Preload finished");
        cached
    }

    // == Purge Expired ==
    pub async fn purge_expired(&self) -> usize {
        self.mutate(|store| store.purge_expired()).await
    }

    // == Clear ==
    /// Drops every entry and the persisted snapshot.
    pub async fn clear(&self) {
        self.mutate(|store| store.clear()).await;
        info!("Image cache cleared");
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.store.read().await.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}
