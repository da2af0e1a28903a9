//! API Module
//!
//! HTTP handlers and routing for the image service REST API.
//!
//! # Endpoints
//! - `POST /resolve` - Resolve candidate URLs to a renderable image URL
//! - `GET /image?url=` - Fetch (and cache) an image body
//! - `GET /image/peek?url=` - Cached image body only, no download
//! - `POST /preload` - Warm the cache with a batch of URLs
//! - `POST /cache/purge` - Drop expired images
//! - `DELETE /cache` - Drop every image and the persisted snapshot
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
