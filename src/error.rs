// src/error.rs

//! Unified error handling for the gallery pipeline.
//!
//! Run-level failures are [`AppError`] values and abort the run. Per-item
//! upload failures are [`TransferError`] values; the materializer recovers
//! from those locally and only reports them.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input JSON missing or malformed
    #[error("Failed to load posts from {path}: {message}")]
    Load { path: String, message: String },

    /// Upload failure that could not be recovered locally
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Template rendering failed
    #[error("Render error: {0}")]
    Render(String),

    /// Output file could not be written
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    /// Scraper service error
    #[error("Scrape error: {0}")]
    Scrape(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a load error for the given input path.
    pub fn load(path: &Path, message: impl fmt::Display) -> Self {
        Self::Load {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a write error for the given output path.
    pub fn write(path: &Path, message: impl fmt::Display) -> Self {
        Self::Write {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create a scrape error.
    pub fn scrape(message: impl Into<String>) -> Self {
        Self::Scrape(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Failure to move one media item into the object store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Source answered with a non-success status
    #[error("download of {url} failed with status {status}")]
    Download { url: String, status: u16 },

    /// Source could not be reached or its body could not be read
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Destination write was rejected
    #[error("store write to {key} failed: {message}")]
    Store { key: String, message: String },

    /// Upload did not finish in time
    #[error("upload timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl TransferError {
    /// Create a request error from any displayable cause.
    pub fn request(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Request {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a store error from any displayable cause.
    pub fn store(key: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Store {
            key: key.into(),
            message: message.to_string(),
        }
    }
}
