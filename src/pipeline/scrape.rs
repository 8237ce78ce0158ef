// src/pipeline/scrape.rs

//! Profile scraping to a timestamped JSON file.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::ApifyClient;
use crate::utils::fs::write_atomic;
use crate::utils::run_stamp;

/// `scraped_data_{stamp}.json`
pub fn scraped_file_name(stamp: &str) -> String {
    format!("scraped_data_{stamp}.json")
}

/// Scrape `profile_url` and save the raw items under `output_dir`.
///
/// Returns the path of the written file.
pub async fn run_scrape(
    config: &Config,
    scraper: &ApifyClient,
    profile_url: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let path = output_dir.join(scraped_file_name(&run_stamp(Local::now())));
    scrape_to(config, scraper, profile_url, &path).await?;
    Ok(path)
}

pub(super) async fn scrape_to(
    config: &Config,
    scraper: &ApifyClient,
    profile_url: &str,
    path: &Path,
) -> Result<usize> {
    let items = scraper
        .scrape_profile(
            &config.scraper.actor,
            profile_url,
            config.scraper.results_limit,
            config.scraper.dataset_limit,
        )
        .await?;

    write_items(&items, path).await?;
    log::info!("Saved {} items to {}", items.len(), path.display());
    Ok(items.len())
}

/// Write items as a pretty-printed JSON array.
async fn write_items(items: &[serde_json::Value], path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(items)?;
    write_atomic(path, &json)
        .await
        .map_err(|e| AppError::write(path, e))
}
