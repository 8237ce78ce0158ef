//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scraper service settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Media download settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// Object store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Page rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override secrets and deployment values from the environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("APIFY_TOKEN") {
            self.scraper.token = Some(token);
        }
        if let Some(bucket) = non_empty("STORAGE_BUCKET").or_else(|| non_empty("GCS_BUCKET_NAME"))
        {
            self.storage.bucket = bucket;
        }
        if let Some(base) = non_empty("STORAGE_PUBLIC_URL") {
            self.storage.public_url_base = Some(base);
        }
        if let Some(endpoint) = non_empty("STORAGE_ENDPOINT") {
            self.storage.endpoint_url = Some(endpoint);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.upload.user_agent.trim().is_empty() {
            return Err(AppError::validation("upload.user_agent is empty"));
        }
        if self.upload.timeout_secs == 0 {
            return Err(AppError::validation("upload.timeout_secs must be > 0"));
        }
        if self.upload.max_concurrent == 0 {
            return Err(AppError::validation("upload.max_concurrent must be > 0"));
        }
        if self.upload.key_prefix.contains("..") {
            return Err(AppError::validation("upload.key_prefix must not contain '..'"));
        }
        if self.upload.extension.trim().is_empty() {
            return Err(AppError::validation("upload.extension is empty"));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(AppError::validation("storage.bucket is empty"));
        }
        if self.scraper.actor.trim().is_empty() {
            return Err(AppError::validation("scraper.actor is empty"));
        }
        if self.scraper.results_limit == 0 {
            return Err(AppError::validation("scraper.results_limit must be > 0"));
        }
        if self.render.gallery_limit == 0 {
            return Err(AppError::validation("render.gallery_limit must be > 0"));
        }
        if self.render.landing_count > self.render.gallery_limit {
            return Err(AppError::validation(
                "render.landing_count must not exceed render.gallery_limit",
            ));
        }
        self.render.template.parse::<crate::render::Template>()?;
        Ok(())
    }
}

/// Apify actor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// API token, usually supplied through `APIFY_TOKEN`
    #[serde(default)]
    pub token: Option<String>,

    /// Actor to run (`username~actor-name` or actor id)
    #[serde(default = "defaults::actor")]
    pub actor: String,

    /// Maximum posts requested from the actor
    #[serde(default = "defaults::results_limit")]
    pub results_limit: u32,

    /// Maximum dataset items fetched after the run
    #[serde(default = "defaults::dataset_limit")]
    pub dataset_limit: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            token: None,
            actor: defaults::actor(),
            results_limit: defaults::results_limit(),
            dataset_limit: defaults::dataset_limit(),
        }
    }
}

/// Media download and upload behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// User-Agent header for image downloads
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-upload timeout in seconds (download plus store write)
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum uploads in flight
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Destination key prefix
    #[serde(default = "defaults::key_prefix")]
    pub key_prefix: String,

    /// Destination key extension
    #[serde(default = "defaults::extension")]
    pub extension: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            key_prefix: defaults::key_prefix(),
            extension: defaults::extension(),
        }
    }
}

/// Object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::bucket")]
    pub bucket: String,

    /// Base for public object URLs (`{base}/{key}`)
    #[serde(default)]
    pub public_url_base: Option<String>,

    /// Custom endpoint for S3-compatible services
    #[serde(default)]
    pub endpoint_url: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub force_path_style: bool,

    /// Key prefix for run artifacts (scraped JSON, rendered HTML)
    #[serde(default = "defaults::artifact_prefix")]
    pub artifact_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: defaults::bucket(),
            public_url_base: None,
            endpoint_url: None,
            region: None,
            force_path_style: false,
            artifact_prefix: defaults::artifact_prefix(),
        }
    }
}

impl StorageConfig {
    /// Public URL base, falling back to the virtual-hosted S3 form.
    pub fn public_base(&self) -> String {
        self.public_url_base
            .clone()
            .unwrap_or_else(|| format!("https://{}.s3.amazonaws.com", self.bucket))
    }
}

/// Post ordering applied after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep first-seen order
    None,
    /// Newest first
    #[default]
    TimestampDesc,
}

/// Where posts without a usable timestamp go when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTimestamps {
    First,
    #[default]
    Last,
}

/// Page rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Template name: `cms` or `gallery`
    #[serde(default = "defaults::template")]
    pub template: String,

    /// Page title for the `cms` template
    #[serde(default = "defaults::title")]
    pub title: String,

    #[serde(default)]
    pub sort: SortOrder,

    #[serde(default)]
    pub missing_timestamps: MissingTimestamps,

    /// Posts kept by the `gallery` template
    #[serde(default = "defaults::gallery_limit")]
    pub gallery_limit: usize,

    /// Posts shown in the `gallery` landing section
    #[serde(default = "defaults::landing_count")]
    pub landing_count: usize,

    /// Caption length in grapheme clusters before truncation
    #[serde(default = "defaults::caption_chars")]
    pub caption_chars: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template: defaults::template(),
            title: defaults::title(),
            sort: SortOrder::default(),
            missing_timestamps: MissingTimestamps::default(),
            gallery_limit: defaults::gallery_limit(),
            landing_count: defaults::landing_count(),
            caption_chars: defaults::caption_chars(),
        }
    }
}

/// Where run artifacts are written locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Scraper defaults
    pub fn actor() -> String {
        "apify~instagram-scraper".into()
    }
    pub fn results_limit() -> u32 {
        100
    }
    pub fn dataset_limit() -> u32 {
        10_000
    }

    // Upload defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; instafolio/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn key_prefix() -> String {
        "images".into()
    }
    pub fn extension() -> String {
        "jpg".into()
    }

    // Storage defaults
    pub fn bucket() -> String {
        "instafolio-media".into()
    }
    pub fn artifact_prefix() -> String {
        "pages".into()
    }

    // Render defaults
    pub fn template() -> String {
        "cms".into()
    }
    pub fn title() -> String {
        "Instagram Posts".into()
    }
    pub fn gallery_limit() -> usize {
        12
    }
    pub fn landing_count() -> usize {
        3
    }
    pub fn caption_chars() -> usize {
        280
    }

    pub fn output_dir() -> String {
        "static".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
