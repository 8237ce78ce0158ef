//! Pipeline stages and entry points.
//!
//! - `run_scrape`: Fetch a profile's posts into `scraped_data_{stamp}.json`
//! - `run_build`: Turn scraped JSON into an HTML page
//! - `run_pipeline`: Scrape → Build

pub mod build;
pub mod load;
pub mod materialize;
pub mod normalize;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod scrape;

pub use build::{BuildSummary, run_build};
pub use load::load_posts;
pub use materialize::{
    MaterializeOptions, MaterializeReport, Materialized, MediaRole, TransferFailure, materialize,
};
pub use normalize::{normalize, sort_posts};
pub use pipeline::{page_file_name, run_pipeline};
pub use scrape::{run_scrape, scraped_file_name};
