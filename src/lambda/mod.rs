// src/lambda/mod.rs

//! AWS Lambda handler.
//!
//! One invocation is one pipeline run:
//! 1. Scrape the requested profile into the function's temp directory
//! 2. Build the page, mirroring media into the bucket
//! 3. Upload the scraped JSON and the page under `storage.artifact_prefix`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::load_config_from_env;
use crate::error::{AppError, Result};
use crate::pipeline::{BuildSummary, run_pipeline};
use crate::render::Template;
use crate::services::{ApifyClient, HttpUploader};
use crate::storage::ObjectStore;
use crate::storage::s3::S3ObjectStore;
use crate::utils::http;

/// Lambda invocation payload.
#[derive(Debug, Deserialize)]
pub struct PageRequest {
    /// Profile to scrape
    pub profile_url: String,

    /// Overrides `scraper.results_limit`
    #[serde(default)]
    pub results_limit: Option<u32>,

    /// Overrides `render.template`
    #[serde(default)]
    pub template: Option<String>,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct PageResponse {
    pub success: bool,

    /// Posts on the rendered page
    pub post_count: usize,

    /// Images served from their source URL after a failed upload
    pub fallback_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraped_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<PageRequest>,
) -> std::result::Result<PageResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!(
        "Starting run: profile_url={}, results_limit={:?}, template={:?}",
        request.profile_url, request.results_limit, request.template
    );

    match run_page(&request).await {
        Ok(mut response) => {
            response.execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Run completed: {} posts, {} fallbacks in {}ms",
                response.post_count, response.fallback_count, response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Run failed: {}", e);
            Ok(PageResponse {
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

async fn run_page(request: &PageRequest) -> Result<PageResponse> {
    let mut config = load_config_from_env()?;
    if let Some(limit) = request.results_limit {
        config.scraper.results_limit = limit;
    }
    if let Some(template) = &request.template {
        config.render.template = template.parse::<Template>()?.name().to_string();
    }

    let token = config
        .scraper
        .token
        .clone()
        .ok_or_else(|| AppError::config("APIFY_TOKEN is not set"))?;
    let scraper = ApifyClient::new(http::create_api_client()?, token);

    let store = Arc::new(S3ObjectStore::from_config(&config.storage).await?);
    let uploader = HttpUploader::new(
        http::create_async_client(&config.upload)?,
        store.clone(),
        Duration::from_secs(config.upload.timeout_secs),
    );

    let work_dir = std::env::temp_dir();
    let summary = run_pipeline(
        &config,
        &scraper,
        &uploader,
        &request.profile_url,
        &work_dir,
    )
    .await?;

    let prefix = &config.storage.artifact_prefix;
    let scraped_url =
        put_artifact(store.as_ref(), prefix, &summary.input, "application/json").await?;
    let page_url = put_artifact(
        store.as_ref(),
        prefix,
        &summary.output,
        "text/html; charset=utf-8",
    )
    .await?;

    Ok(response_for(&summary, scraped_url, page_url))
}

/// Upload a local artifact as `{prefix}/{file name}`.
async fn put_artifact(
    store: &dyn ObjectStore,
    prefix: &str,
    path: &Path,
    content_type: &str,
) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let key = artifact_key(prefix, path);
    let url = store.put_object(&key, bytes, Some(content_type)).await?;
    info!("Uploaded {} to {}", path.display(), url);
    Ok(url)
}

fn artifact_key(prefix: &str, path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}/{name}")
    }
}

fn response_for(summary: &BuildSummary, scraped_url: String, page_url: String) -> PageResponse {
    PageResponse {
        success: true,
        post_count: summary.post_count,
        fallback_count: summary.report.failures.len(),
        scraped_url: Some(scraped_url),
        page_url: Some(page_url),
        error: None,
        execution_time_ms: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let json = r#"{"profile_url": "https://www.instagram.com/nightowl/"}"#;
        let req: PageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.profile_url, "https://www.instagram.com/nightowl/");
        assert!(req.results_limit.is_none());
        assert!(req.template.is_none());
    }

    #[test]
    fn test_page_request_with_options() {
        let json = r#"{"profile_url": "https://www.instagram.com/nightowl/", "results_limit": 12, "template": "gallery"}"#;
        let req: PageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.results_limit, Some(12));
        assert_eq!(req.template.as_deref(), Some("gallery"));
    }

    #[test]
    fn test_artifact_key() {
        let path = Path::new("/tmp/cms_20250301120000.html");
        assert_eq!(artifact_key("pages", path), "pages/cms_20250301120000.html");
        assert_eq!(artifact_key("/", path), "cms_20250301120000.html");
    }

    #[test]
    fn test_error_response_omits_urls() {
        let response = PageResponse {
            error: Some("boom".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("page_url").is_none());
    }
}
