//! API Handlers
//!
//! HTTP request handlers for each image service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::debug;

use crate::cache::{BlobCacheManager, FileStorage, ImageCacheStore, SystemClock};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::fetch::{FetchError, HttpFetcher, ImageFetcher};
use crate::models::{
    ClearResponse, HealthResponse, ImageQuery, PreloadRequest, PreloadResponse, PurgeResponse,
    ResolveRequest, ResolveResponse, StatsResponse,
};
use crate::probe::AccessibilityProbe;
use crate::resolver::FallbackResolver;

/// Application state shared across all handlers.
///
/// Both members are cheap to clone and share their inner state.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<FallbackResolver>,
    pub cache: BlobCacheManager,
}

impl AppState {
    /// Creates a new AppState from already built components.
    pub fn new(resolver: FallbackResolver, cache: BlobCacheManager) -> Self {
        Self {
            resolver: Arc::new(resolver),
            cache,
        }
    }

    /// Wires the probe, resolver and cache around one fetcher.
    ///
    /// The cache is restored from `config.cache_dir` before this returns.
    /// Fails only if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> std::result::Result<Self, FetchError> {
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpFetcher::new()?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let store = ImageCacheStore::open(
            config.max_entries,
            config.ttl(),
            Arc::new(FileStorage::new(&config.cache_dir)),
            Arc::new(SystemClock),
        );
        let probe = Arc::new(AccessibilityProbe::new(fetcher.clone()));
        let resolver = FallbackResolver::new(probe, config.asset_base_url.clone());

        Self::new(resolver, BlobCacheManager::new(store, fetcher))
    }
}

/// Handler for POST /resolve
///
/// Never fails for a well-formed body: the worst case is the placeholder.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Json<ResolveResponse> {
    let resolution = if req.use_cache {
        state
            .resolver
            .resolve_cached(&state.cache, &req.candidates, req.category)
            .await
    } else {
        state
            .resolver
            .resolve_detailed(&req.candidates, req.category)
            .await
    };

    Json(resolution.into())
}

/// Handler for GET /image?url=
///
/// Serves the image from cache, downloading it first if needed.
pub async fn image_handler(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let content = state
        .cache
        .fetch_and_cache(query.url.trim())
        .await
        .ok_or_else(|| CacheError::NotFound(query.url.clone()))?;

    Ok(image_response(content))
}

/// Handler for GET /image/peek?url=
///
/// Serves the image only if it is already cached. Never downloads.
pub async fn peek_handler(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let content = state
        .cache
        .peek(query.url.trim())
        .await
        .ok_or_else(|| CacheError::NotFound(query.url.clone()))?;

    Ok(image_response(content))
}

/// Handler for POST /preload
///
/// Starts the downloads in the background and answers right away.
pub async fn preload_handler(
    State(state): State<AppState>,
    Json(req): Json<PreloadRequest>,
) -> Result<(StatusCode, Json<PreloadResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let requested = req.urls.len();
    let cache = state.cache.clone();
    tokio::spawn(async move {
        cache.preload(req.urls).await;
    });

    Ok((StatusCode::ACCEPTED, Json(PreloadResponse::new(requested))))
}

/// Handler for POST /cache/purge
pub async fn purge_handler(State(state): State<AppState>) -> Json<PurgeResponse> {
    let removed = state.cache.purge_expired().await;
    Json(PurgeResponse { removed })
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear().await;
    Json(ClearResponse::cleared())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::new(&stats, state.resolver.probe().probe_count()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

fn image_response(content: Bytes) -> Response {
    let content_type = sniff_content_type(&content);
    debug!(content_type, bytes = content.len(), "Serving image");
    ([(header::CONTENT_TYPE, content_type)], content).into_response()
}

/// Guesses an image MIME type from its leading bytes.
pub fn sniff_content_type(content: &[u8]) -> &'static str {
    match content {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ if content.starts_with(b"<svg") || content.starts_with(b"<?xml") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
