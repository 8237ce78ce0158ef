// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::UploadConfig;

/// Request timeout for scraper API calls; must outlast the run long-poll.
const API_TIMEOUT_SECS: u64 = 120;

/// Create a configured asynchronous HTTP client for media downloads.
pub fn create_async_client(config: &UploadConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create a client for the scraper REST API.
pub fn create_api_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(API_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_build() {
        assert!(create_async_client(&UploadConfig::default()).is_ok());
        assert!(create_api_client().is_ok());
    }
}
