//! Cached Image Module
//!
//! Defines a single cached image body with its creation and expiry times.

use std::time::Duration;

use bytes::Bytes;

// == Cached Image ==
/// One downloaded image, keyed by the URL it came from.
///
/// Lifecycle: absent -> live (fetched) -> expired (time passes) -> absent
/// (purged, evicted or cleared). A refetch after expiry replaces the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    /// URL the content was downloaded from
    pub source_url: String,
    /// Image body
    pub content: Bytes,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CachedImage {
    // == Constructor ==
    /// Creates an entry created at `now_ms` that lives for `ttl`.
    pub fn new(source_url: impl Into<String>, content: Bytes, now_ms: u64, ttl: Duration) -> Self {
        Self {
            source_url: source_url.into(),
            content,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now_ms >= expires_at`.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}
