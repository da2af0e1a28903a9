//! Accessibility Probe
//!
//! Decides whether an image URL can be loaded, with one timed attempt per
//! URL. Results are memoized for the lifetime of the probe and never
//! re-checked, so a URL that was down once stays "down" until `forget` or
//! `reset` is called.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::PROBE_TIMEOUT;
use crate::fetch::ImageFetcher;

type Memo = HashMap<String, Arc<OnceCell<bool>>>;

// == Accessibility Probe ==
pub struct AccessibilityProbe {
    fetcher: Arc<dyn ImageFetcher>,
    memo: Mutex<Memo>,
    timeout: Duration,
    probes: AtomicUsize,
}

impl AccessibilityProbe {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher,
            memo: Mutex::new(HashMap::new()),
            timeout: PROBE_TIMEOUT,
            probes: AtomicUsize::new(0),
        }
    }

    // == Is Accessible ==
    /// Returns whether `url` loads within the probe timeout.
    ///
    /// Concurrent callers asking about the same URL share a single probe.
    /// Errors and timeouts both resolve to `false`; the timed-out request is
    /// dropped rather than awaited.
    pub async fn is_accessible(&self, url: &str) -> bool {
        let cell = self.cell_for(url);

        *cell
            .get_or_init(|| async {
                self.probes.fetch_add(1, Ordering::Relaxed);
                self.load(url).await
            })
            .await
    }

    async fn load(&self, url: &str) -> bool {
        match tokio::time::timeout(self.timeout, self.fetcher.fetch(url)).await {
            Ok(Ok(_)) => {
                debug!(url, "Probe succeeded");
                true
            }
            Ok(Err(err)) => {
                debug!(url, error = %err, "Probe failed");
                false
            }
            Err(_) => {
                debug!(url, timeout_ms = self.timeout.as_millis() as u64, "Probe timed out");
                false
            }
        }
    }

    fn cell_for(&self, url: &str) -> Arc<OnceCell<bool>> {
        let mut memo = self.lock_memo();
        memo.entry(url.to_string()).or_default().clone()
    }

    fn lock_memo(&self) -> std::sync::MutexGuard<'_, Memo> {
        self.memo.lock().unwrap_or_else(|poisoned| {
            warn!("Probe memo lock was poisoned, continuing with inner state");
            poisoned.into_inner()
        })
    }

    // == Memoized ==
    /// Returns the remembered result for `url` without probing.
    pub fn memoized(&self, url: &str) -> Option<bool> {
        self.lock_memo().get(url).and_then(|cell| cell.get().copied())
    }

    // == Forget ==
    /// Drops the remembered result for `url` so the next call probes again.
    pub fn forget(&self, url: &str) -> bool {
        self.lock_memo().remove(url).is_some()
    }

    // == Reset ==
    /// Drops every remembered result.
    pub fn reset(&self) {
        self.lock_memo().clear();
    }

    /// Number of network probes issued so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }
}
