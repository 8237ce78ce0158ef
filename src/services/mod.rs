//! Service layer for the gallery pipeline.
//!
//! This module contains the collaborators the pipeline talks to:
//! - Scraper runs (`ApifyClient`)
//! - Media mirroring (`Uploader`, `HttpUploader`)

mod apify;
mod uploader;

pub use apify::{ApifyClient, InstagramScraperInput, RunData};
pub use uploader::{HttpUploader, Uploader};
