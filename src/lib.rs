//! Tapalqué Images - resilient image resolution for the Tapalqué directory portal
//!
//! Resolves listing image URLs to something that always renders, and keeps
//! a bounded, expiring, persisted cache of downloaded image bodies.

pub mod api;
pub mod cache;
pub mod category;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod probe;
pub mod resolver;
pub mod tasks;

pub use api::AppState;
pub use cache::BlobCacheManager;
pub use category::Category;
pub use config::Config;
pub use probe::AccessibilityProbe;
pub use resolver::{FallbackResolver, Resolution, Source};
pub use tasks::spawn_cleanup_task;
