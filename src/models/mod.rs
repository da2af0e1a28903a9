//! Request and Response models for the image service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ImageQuery, PreloadRequest, ResolveRequest, MAX_PRELOAD_URLS};
pub use responses::{
    ClearResponse, HealthResponse, PreloadResponse, PurgeResponse, ResolveResponse, StatsResponse,
};
