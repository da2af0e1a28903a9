//! Image Fetching
//!
//! Network seam shared by the accessibility probe and the blob cache.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client};
use thiserror::Error;
use tracing::debug;

use crate::config::FETCH_TIMEOUT;

// == Fetch Error ==
/// Why an image load failed.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure (DNS, connect, reset)
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("unexpected status {0}")]
    Status(u16),

    /// Server answered with something that is not an image
    #[error("not an image: {0}")]
    NotAnImage(String),

    /// Request did not finish in time
    #[error("timed out")]
    Timeout,

    /// HTTP client could not be configured
    #[error("http client setup failed: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

// == Image Fetcher ==
/// Loads the body of an image URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

// == HTTP Fetcher ==
/// `reqwest`-backed fetcher used in production.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default download timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    /// A load succeeds on a 2xx answer whose Content-Type, when present, is `image/*`.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default();
            if !content_type.starts_with("image/") {
                return Err(FetchError::NotAnImage(content_type.to_string()));
            }
        }

        let body = response.bytes().await?;
        debug!(url, bytes = body.len(), "Fetched image");
        Ok(body)
    }
}
