// src/models/mod.rs

//! Domain models for the gallery pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod post;

// Re-export all public types
pub use config::{
    Config, LoggingConfig, MissingTimestamps, PathsConfig, RenderConfig, ScraperConfig, SortOrder,
    StorageConfig, UploadConfig,
};
pub use post::{ChildPost, NormalizedPost, RawPost};
