//! Response DTOs for the image service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::resolver::{Resolution, Source};

/// Response body for POST /resolve
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    /// URL safe to use as an image source
    pub url: String,
    /// Tier that produced the URL
    pub source: Source,
}

impl From<Resolution> for ResolveResponse {
    fn from(resolution: Resolution) -> Self {
        Self {
            url: resolution.url,
            source: resolution.source,
        }
    }
}

/// Response body for POST /preload
#[derive(Debug, Clone, Serialize)]
pub struct PreloadResponse {
    pub message: String,
    pub requested: usize,
}

impl PreloadResponse {
    pub fn new(requested: usize) -> Self {
        Self {
            message: format!("Preloading {} images", requested),
            requested,
        }
    }
}

/// Response body for POST /cache/purge
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    pub removed: usize,
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Image cache cleared".to_string(),
        }
    }
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired: u64,
    pub fetch_failures: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Network probes issued by the accessibility probe
    pub probes: usize,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, probes: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expired: stats.expired,
            fetch_failures: stats.fetch_failures,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            probes,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_response_serialize() {
        let resp = ResolveResponse {
            url: "/assets/fallback/lodging/1.jpg".to_string(),
            source: Source::LocalFallback,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"source\":\"local_fallback\""));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(&stats, 3);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.probes, 3);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_preload_response_message() {
        let resp = PreloadResponse::new(4);
        assert_eq!(resp.message, "Preloading 4 images");
    }
}
