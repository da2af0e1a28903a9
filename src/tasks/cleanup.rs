//! Expiry Purge Task
//!
//! Background task that periodically removes expired cached images.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::BlobCacheManager;

/// Spawns a background task that periodically purges expired images.
///
/// The task sleeps for `cleanup_interval_secs` between runs and never
/// touches the network.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(manager.clone(), 300);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: BlobCacheManager, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting image purge task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!("Image purge: removed {} expired images", removed);
            } else {
                debug!("Image purge: no expired images found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ImageCacheStore, ManualClock, MemoryStorage};
    use crate::fetch::mock::MockFetcher;
    use std::sync::Arc;

    fn manager_with_clock(fetcher: MockFetcher) -> (BlobCacheManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let store = ImageCacheStore::open(
            10,
            Duration::from_millis(500),
            Arc::new(MemoryStorage::new()),
            clock.clone(),
        );
        (BlobCacheManager::new(store, Arc::new(fetcher)), clock)
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let url = "https://ok.example/a.jpg";
        let (cache, clock) = manager_with_clock(MockFetcher::new().image(url, b"img"));
        cache.fetch_and_cache(url).await;

        clock.advance_ms(1_000);
        let handle = spawn_cleanup_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.len().await, 0, "Expired image should have been purged");
        assert_eq!(cache.stats().await.expired, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_live_entries() {
        let url = "https://ok.example/a.jpg";
        let (cache, _clock) = manager_with_clock(MockFetcher::new().image(url, b"img"));
        cache.fetch_and_cache(url).await;

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.contains(url).await, "Live image should not be removed");

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let (cache, _) = manager_with_clock(MockFetcher::new());

        let handle = spawn_cleanup_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
