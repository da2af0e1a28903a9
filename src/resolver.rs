//! Fallback Resolver
//!
//! Turns a listing's candidate image URLs into one URL that is guaranteed
//! to render: the first reachable candidate, else the first reachable
//! local fallback for the category, else the category's inline placeholder.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::BlobCacheManager;
use crate::category::Category;
use crate::probe::AccessibilityProbe;

// == Resolution ==
/// Which tier produced a resolved URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Candidate,
    Cache,
    LocalFallback,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub url: String,
    pub source: Source,
}

impl Resolution {
    fn new(url: impl Into<String>, source: Source) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

// == Fallback Resolver ==
pub struct FallbackResolver {
    probe: Arc<AccessibilityProbe>,
    asset_base_url: String,
}

impl FallbackResolver {
    /// `asset_base_url` is where local fallback paths are served from; it is
    /// only used for probing, the returned value stays the bare path.
    pub fn new(probe: Arc<AccessibilityProbe>, asset_base_url: impl Into<String>) -> Self {
        Self {
            probe,
            asset_base_url: asset_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn probe(&self) -> &Arc<AccessibilityProbe> {
        &self.probe
    }

    // == Resolve ==
    /// Returns a URL that is always usable as an image source.
    pub async fn resolve(&self, candidates: &[String], category: Category) -> String {
        self.resolve_detailed(candidates, category).await.url
    }

    /// Same as [`resolve`](Self::resolve), reporting which tier answered.
    ///
    /// Candidates are tried one after another in the given order; empty
    /// strings are skipped. An empty list goes straight to the placeholder
    /// without touching the network.
    pub async fn resolve_detailed(&self, candidates: &[String], category: Category) -> Resolution {
        self.resolve_inner(None, candidates, category).await
    }

    // == Resolve Cached ==
    /// Like [`resolve_detailed`](Self::resolve_detailed), but a candidate
    /// that has a live entry in `cache` wins without being probed.
    ///
    /// Lookups go through [`BlobCacheManager::peek`], so they count in the
    /// cache statistics and drop expired entries.
    pub async fn resolve_cached(
        &self,
        cache: &BlobCacheManager,
        candidates: &[String],
        category: Category,
    ) -> Resolution {
        self.resolve_inner(Some(cache), candidates, category).await
    }

    async fn resolve_inner(
        &self,
        cache: Option<&BlobCacheManager>,
        candidates: &[String],
        category: Category,
    ) -> Resolution {
        if candidates.is_empty() {
            debug!(%category, "No candidates, using placeholder");
            return Resolution::new(category.placeholder(), Source::Placeholder);
        }

        for candidate in candidates.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            if let Some(cache) = cache {
                if cache.peek(candidate).await.is_some() {
                    return Resolution::new(candidate, Source::Cache);
                }
            }
            if self.probe.is_accessible(candidate).await {
                return Resolution::new(candidate, Source::Candidate);
            }
        }

        for path in category.local_fallbacks() {
            let asset_url = format!("{}{}", self.asset_base_url, path);
            if self.probe.is_accessible(&asset_url).await {
                info!(%category, path = %path, "Candidates unreachable, using local fallback");
                return Resolution::new(path, Source::LocalFallback);
            }
        }

        info!(%category, "Nothing reachable, using placeholder");
        Resolution::new(category.placeholder(), Source::Placeholder)
    }
}
