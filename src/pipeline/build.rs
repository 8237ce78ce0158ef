// src/pipeline/build.rs

//! Page build: scraped JSON in, one HTML page out.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::render::{self, RenderVars, Template};
use crate::services::Uploader;
use crate::utils::fs::write_atomic;

use super::load::load_posts;
use super::materialize::{MaterializeOptions, MaterializeReport, materialize};
use super::normalize::{normalize, sort_posts};

/// What a build produced.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub template: Template,
    /// Records read from the input file
    pub raw_count: usize,
    /// Posts on the page
    pub post_count: usize,
    /// Carousel children on the page
    pub child_count: usize,
    pub report: MaterializeReport,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Run a build: load, normalize, sort, materialize, render, write.
///
/// Upload failures do not fail the build; they show up in the summary's
/// report. Any other failure aborts before `output` is touched.
pub async fn run_build(
    config: &Config,
    input: &Path,
    output: &Path,
    uploader: &dyn Uploader,
) -> Result<BuildSummary> {
    let template: Template = config.render.template.parse()?;

    let raw_posts = load_posts(input).await?;
    let raw_count = raw_posts.len();

    let mut posts = normalize(raw_posts);
    log::info!("Normalized {} records into {} posts", raw_count, posts.len());
    sort_posts(
        &mut posts,
        config.render.sort,
        config.render.missing_timestamps,
    );

    if template == Template::Gallery && posts.len() > config.render.gallery_limit {
        log::debug!(
            "Limiting gallery to {} of {} posts",
            config.render.gallery_limit,
            posts.len()
        );
        posts.truncate(config.render.gallery_limit);
    }

    let options = MaterializeOptions::from(&config.upload);
    let materialized = materialize(posts, uploader, &options).await;
    let posts = materialized.posts;

    let vars = RenderVars::from_config(&config.render, &posts);
    let html = render::render(template, &posts, &vars)?;

    write_atomic(output, html.as_bytes())
        .await
        .map_err(|e| AppError::write(output, e))?;

    let summary = BuildSummary {
        template,
        raw_count,
        post_count: posts.len(),
        child_count: posts.iter().map(|p| p.child_posts.len()).sum(),
        report: materialized.report,
        input: input.to_path_buf(),
        output: output.to_path_buf(),
    };
    log_summary(&summary);

    Ok(summary)
}

fn log_summary(summary: &BuildSummary) {
    log::info!(
        "Rendered {} posts ({} children) with '{}' template to {}",
        summary.post_count,
        summary.child_count,
        summary.template,
        summary.output.display()
    );
    log::info!(
        "Media: {} uploaded, {} without source, {} using source URL",
        summary.report.uploaded,
        summary.report.missing_source,
        summary.report.failures.len()
    );
    for failure in &summary.report.failures {
        log::debug!(
            "  {} -> {}: {}",
            failure.source_url,
            failure.destination_key,
            failure.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransferError;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct StoreUploader;

    #[async_trait]
    impl Uploader for StoreUploader {
        async fn upload(
            &self,
            source_url: &str,
            key: &str,
        ) -> std::result::Result<String, TransferError> {
            if source_url.contains("broken") {
                return Err(TransferError::Timeout { secs: 30 });
            }
            Ok(format!("https://store/{key}"))
        }
    }

    const SCRAPED: &str = r#"[
        {"id":"1","shortCode":"s1","images":["http://x/a.jpg"],"ownerUsername":"nightowl",
         "timestamp":"2025-03-01T10:00:00.000Z","caption":"first-of-march"},
        {"id":"2","shortCode":"s1","images":["http://x/broken.jpg"]},
        {"id":"3","shortCode":"s3","displayUrl":"http://x/c.jpg",
         "timestamp":"2025-03-02T10:00:00.000Z","caption":"second-of-march",
         "ownerUsername":"nightowl"},
        {"id":"4","shortCode":"s4"}
    ]"#;

    fn fixture(tmp: &TempDir) -> PathBuf {
        let input = tmp.path().join("scraped_data_20250301120000.json");
        std::fs::write(&input, SCRAPED).unwrap();
        input
    }

    #[tokio::test]
    async fn test_build_cms_page() {
        let tmp = TempDir::new().unwrap();
        let input = fixture(&tmp);
        let output = tmp.path().join("out").join("cms.html");

        let summary = run_build(&Config::default(), &input, &output, &StoreUploader)
            .await
            .unwrap();

        assert_eq!(summary.template, Template::Cms);
        assert_eq!(summary.raw_count, 4);
        assert_eq!(summary.post_count, 3);
        assert_eq!(summary.child_count, 1);
        assert_eq!(summary.report.uploaded, 2);
        assert_eq!(summary.report.missing_source, 1);
        assert_eq!(summary.report.failures.len(), 1);

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("https://store/images/1.jpg"));
        assert!(html.contains("http://x/broken.jpg"));
        // newest first
        assert!(html.find("second-of-march").unwrap() < html.find("first-of-march").unwrap());
    }

    #[tokio::test]
    async fn test_build_gallery_limits_posts() {
        let tmp = TempDir::new().unwrap();
        let input = fixture(&tmp);
        let output = tmp.path().join("gallery.html");

        let mut config = Config::default();
        config.render.template = "gallery".to_string();
        config.render.gallery_limit = 2;
        config.render.landing_count = 1;

        let summary = run_build(&config, &input, &output, &StoreUploader)
            .await
            .unwrap();

        assert_eq!(summary.post_count, 2);
        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("@nightowl"));
        assert!(!html.contains(r#"data-id="4""#));
    }

    #[tokio::test]
    async fn test_missing_input_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("cms.html");

        let err = run_build(
            &Config::default(),
            &tmp.path().join("missing.json"),
            &output,
            &StoreUploader,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Load { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_unknown_template_is_render_error() {
        let tmp = TempDir::new().unwrap();
        let input = fixture(&tmp);
        let mut config = Config::default();
        config.render.template = "nightclub".to_string();

        let err = run_build(&config, &input, &tmp.path().join("x.html"), &StoreUploader)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }
}
