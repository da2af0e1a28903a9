//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry purge: drops expired cached images at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
