// src/pipeline/load.rs

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::RawPost;

/// Load scraped posts from a JSON array file.
///
/// A missing, unreadable, or malformed file is a [`AppError::Load`].
pub async fn load_posts(path: &Path) -> Result<Vec<RawPost>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::load(path, e))?;
    let posts: Vec<RawPost> =
        serde_json::from_slice(&bytes).map_err(|e| AppError::load(path, e))?;

    log::info!("Loaded {} records from {}", posts.len(), path.display());
    Ok(posts)
}
