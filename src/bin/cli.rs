//! Instafolio CLI
//!
//! Local execution entry point. For AWS Lambda, use `instafolio-lambda`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::{Parser, Subcommand};
use instafolio::{
    config::load_config,
    error::{AppError, Result},
    models::Config,
    pipeline,
    render::Template,
    services::{ApifyClient, HttpUploader},
    storage::{LocalObjectStore, ObjectStore},
    utils::{http, run_stamp},
};

/// Instafolio - Instagram profile to static page
#[derive(Parser, Debug)]
#[command(
    name = "instafolio",
    version,
    about = "Scrape an Instagram profile, mirror its media and render a page"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Store media in this directory instead of the S3 bucket
    #[arg(long, global = true)]
    local_store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a profile into scraped_data_{timestamp}.json
    Scrape {
        /// Profile URL, e.g. https://www.instagram.com/<name>/
        #[arg(long)]
        url: String,

        /// Maximum posts to request (default: scraper.results_limit)
        #[arg(long)]
        limit: Option<u32>,

        /// Output directory (default: paths.output_dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Build a page from a scraped JSON file
    Build {
        /// Scraped JSON file
        #[arg(long)]
        input: PathBuf,

        /// Output HTML file (default: {output_dir}/{template}_{timestamp}.html)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Template name: cms or gallery (default: render.template)
        #[arg(long)]
        template: Option<String>,
    },

    /// Run full pipeline: Scrape → Build
    Pipeline {
        /// Profile URL
        #[arg(long)]
        url: String,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        template: Option<String>,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging; `--verbose` wins over the configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Object store for mirrored media.
async fn object_store(config: &Config, local_store: Option<&Path>) -> Result<Arc<dyn ObjectStore>> {
    if let Some(dir) = local_store {
        log::info!("Storing media under {}", dir.display());
        let store = match &config.storage.public_url_base {
            Some(base) => LocalObjectStore::with_public_base(dir, base.clone()),
            None => LocalObjectStore::new(dir),
        };
        return Ok(Arc::new(store));
    }

    #[cfg(feature = "s3")]
    {
        let store = instafolio::storage::S3ObjectStore::from_config(&config.storage).await?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "s3"))]
    Err(AppError::config(
        "built without S3 support; pass --local-store <dir>",
    ))
}

async fn uploader(config: &Config, local_store: Option<&Path>) -> Result<HttpUploader> {
    let store = object_store(config, local_store).await?;
    let client = http::create_async_client(&config.upload)?;
    Ok(HttpUploader::new(
        client,
        store,
        Duration::from_secs(config.upload.timeout_secs),
    ))
}

fn scraper(config: &Config) -> Result<ApifyClient> {
    let token = config
        .scraper
        .token
        .clone()
        .ok_or_else(|| AppError::config("APIFY_TOKEN is not set"))?;
    Ok(ApifyClient::new(http::create_api_client()?, token))
}

/// Apply a `--template` override and re-check it.
fn with_template(mut config: Config, template: Option<String>) -> Result<Config> {
    if let Some(template) = template {
        config.render.template = template.parse::<Template>()?.name().to_string();
    }
    Ok(config)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = Config::load(&cli.config)
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    log::info!("Instafolio starting...");

    let mut config = load_config(&cli.config)?;
    log::info!("Loaded configuration from {}", cli.config.display());

    let local_store = cli.local_store.as_deref();

    match cli.command {
        Command::Scrape {
            url,
            limit,
            output_dir,
        } => {
            if let Some(limit) = limit {
                config.scraper.results_limit = limit;
            }
            let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.paths.output_dir));
            let scraper = scraper(&config)?;

            let path = pipeline::run_scrape(&config, &scraper, &url, &output_dir).await?;
            log::info!("Scraped data saved to {}", path.display());
        }

        Command::Build {
            input,
            output,
            template,
        } => {
            let config = with_template(config, template)?;
            let output = output.unwrap_or_else(|| {
                PathBuf::from(&config.paths.output_dir).join(pipeline::page_file_name(
                    &config.render.template,
                    &run_stamp(Local::now()),
                ))
            });
            let uploader = uploader(&config, local_store).await?;

            let summary = pipeline::run_build(&config, &input, &output, &uploader).await?;
            log::info!("Page written to {}", summary.output.display());
        }

        Command::Pipeline {
            url,
            limit,
            template,
            output_dir,
        } => {
            if let Some(limit) = limit {
                config.scraper.results_limit = limit;
            }
            let config = with_template(config, template)?;
            let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.paths.output_dir));
            let scraper = scraper(&config)?;
            let uploader = uploader(&config, local_store).await?;

            let summary =
                pipeline::run_pipeline(&config, &scraper, &uploader, &url, &output_dir).await?;
            log::info!("Page written to {}", summary.output.display());
        }

        Command::Validate => {
            // load_config already validated; report what will be used
            log::info!("✓ Config OK");
            log::info!(
                "Template '{}', bucket '{}', media prefix '{}'",
                config.render.template,
                config.storage.bucket,
                config.upload.key_prefix
            );
            if config.scraper.token.is_none() {
                log::warn!("APIFY_TOKEN is not set; scrape and pipeline will fail");
            }
            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}
