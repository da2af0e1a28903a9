//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};

/// Timeout for a single accessibility probe. Fixed, not read from the environment.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Timeout for a full image download on the cache path.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of images the blob cache can hold
    pub max_entries: usize,
    /// Lifetime of a cached image in seconds
    pub cache_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background purge interval in seconds
    pub cleanup_interval: u64,
    /// Base URL the local fallback asset paths are served from
    pub asset_base_url: String,
    /// Directory holding the persisted cache snapshot
    pub cache_dir: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cached images (default: 50)
    /// - `CACHE_TTL` - Image lifetime in seconds (default: 86400)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Purge frequency in seconds (default: 300)
    /// - `ASSET_BASE_URL` - Local static asset server (default: http://localhost:3000)
    /// - `CACHE_DIR` - Snapshot directory (default: .tapalque-cache)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            asset_base_url: env::var("ASSET_BASE_URL").unwrap_or(defaults.asset_base_url),
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
        }
    }

    /// Cache TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CAPACITY,
            cache_ttl: DEFAULT_TTL.as_secs(),
            server_port: 3000,
            cleanup_interval: 300,
            asset_base_url: "http://localhost:3000".to_string(),
            cache_dir: PathBuf::from(".tapalque-cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 50);
        assert_eq!(config.cache_ttl, 86_400);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 300);
        assert_eq!(config.ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("MAX_ENTRIES");
        env::remove_var("CACHE_TTL");
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("ASSET_BASE_URL");
        env::remove_var("CACHE_DIR");

        let config = Config::from_env();
        assert_eq!(config.max_entries, 50);
        assert_eq!(config.cache_ttl, 86_400);
        assert_eq!(config.asset_base_url, "http://localhost:3000");
        assert_eq!(config.cache_dir, PathBuf::from(".tapalque-cache"));
    }

    #[test]
    fn test_probe_timeout_is_three_seconds() {
        assert_eq!(PROBE_TIMEOUT.as_millis(), 3000);
    }
}
