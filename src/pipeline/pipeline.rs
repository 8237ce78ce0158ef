// src/pipeline/pipeline.rs

use std::path::Path;

use chrono::Local;

use crate::error::Result;
use crate::models::Config;
use crate::services::{ApifyClient, Uploader};
use crate::utils::run_stamp;

use super::build::{BuildSummary, run_build};
use super::scrape::{scraped_file_name, scrape_to};

/// Run the full pipeline: scrape a profile, then build its page.
///
/// Both artifacts share one run stamp:
/// `scraped_data_{stamp}.json` and `{template}_{stamp}.html` in `output_dir`.
pub async fn run_pipeline(
    config: &Config,
    scraper: &ApifyClient,
    uploader: &dyn Uploader,
    profile_url: &str,
    output_dir: &Path,
) -> Result<BuildSummary> {
    // Fail on a bad template before paying for a scrape
    let template: crate::render::Template = config.render.template.parse()?;
    let stamp = run_stamp(Local::now());

    log::info!("Step 1/2: Scraping {}", profile_url);
    let scraped = output_dir.join(scraped_file_name(&stamp));
    scrape_to(config, scraper, profile_url, &scraped).await?;

    log::info!("Step 2/2: Building '{}' page", template);
    let output = output_dir.join(page_file_name(template.name(), &stamp));
    let summary = run_build(config, &scraped, &output, uploader).await?;

    log::info!("Pipeline complete!");
    Ok(summary)
}

/// `{template}_{stamp}.html`
pub fn page_file_name(template: &str, stamp: &str) -> String {
    format!("{template}_{stamp}.html")
}
