// src/services/apify.rs

//! Apify REST client for the Instagram scraper actor.
//!
//! One run is three calls: start the actor, long-poll the run until it
//! finishes, then page the run's default dataset.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::parse_http_url;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Input for the apify/instagram-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct InstagramScraperInput {
    #[serde(rename = "directUrls")]
    pub direct_urls: Vec<String>,
    #[serde(rename = "resultsType")]
    pub results_type: String,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    #[serde(rename = "scrapeComments")]
    pub scrape_comments: bool,
}

impl InstagramScraperInput {
    /// Posts of a single profile, without comments.
    pub fn posts(profile_url: &str, results_limit: u32) -> Self {
        Self {
            direct_urls: vec![profile_url.to_string()],
            results_type: "posts".to_string(),
            results_limit,
            scrape_comments: false,
        }
    }
}

/// Run metadata returned by the actor endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId", default)]
    pub default_dataset_id: Option<String>,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

/// Explicitly constructed Apify client; one per run or per process.
pub struct ApifyClient {
    client: Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self::with_base_url(client, token, BASE_URL)
    }

    /// Point the client at another API root (tests, proxies).
    pub fn with_base_url(
        client: Client,
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize + ?Sized>(&self, actor: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;
        let api_resp: ApiResponse<RunData> = Self::parse(resp).await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
            let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;
            let api_resp: ApiResponse<RunData> = Self::parse(resp).await?;

            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(AppError::scrape(format!(
                        "run {} finished with status {}",
                        run_id, api_resp.data.status
                    )));
                }
                status => {
                    log::debug!("Run {} still in progress ({})", run_id, status);
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn dataset_items<T: DeserializeOwned>(
        &self,
        dataset_id: &str,
        limit: u32,
    ) -> Result<Vec<T>> {
        let url = format!(
            "{}/datasets/{}/items?format=json&clean=true&limit={}",
            self.base_url, dataset_id, limit
        );
        let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;
        Self::parse(resp).await
    }

    /// Scrape a profile end-to-end: start run, poll, fetch raw items.
    ///
    /// Items are returned as untyped JSON so nothing the actor emits is lost
    /// before it reaches disk.
    pub async fn scrape_profile(
        &self,
        actor: &str,
        profile_url: &str,
        results_limit: u32,
        dataset_limit: u32,
    ) -> Result<Vec<serde_json::Value>> {
        if parse_http_url(profile_url).is_none() {
            return Err(AppError::validation(format!(
                "profile URL must be an http(s) URL: {profile_url}"
            )));
        }

        log::info!("Starting scrape of {} (limit {})", profile_url, results_limit);
        let input = InstagramScraperInput::posts(profile_url, results_limit);
        let run = self.start_run(actor, &input).await?;
        log::info!("Apify run {} started, polling for completion", run.id);

        let completed = self.wait_for_run(&run.id).await?;
        let dataset_id = completed
            .default_dataset_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::scrape("no dataset ID returned from Apify run"))?;
        log::info!("Run {} completed, fetching dataset {}", completed.id, dataset_id);

        let items: Vec<serde_json::Value> = self.dataset_items(&dataset_id, dataset_limit).await?;
        log::info!("Retrieved {} items", items.len());
        Ok(items)
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::scrape(format!(
                "API error (status {}): {}",
                status.as_u16(),
                body
            )));
        }
        Ok(resp.json().await?)
    }
}
