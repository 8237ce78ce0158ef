// src/services/uploader.rs

//! Media uploader service.
//!
//! Downloads a remote image and stores it in an [`ObjectStore`], returning
//! the stored object's public URL. No retries happen here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::TransferError;
use crate::storage::ObjectStore;

/// Moves one media item from a source URL to a destination key.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, source_url: &str, destination_key: &str)
    -> Result<String, TransferError>;
}

/// Uploader that fetches over HTTP and writes to an object store.
pub struct HttpUploader {
    client: Client,
    store: Arc<dyn ObjectStore>,
    timeout: Duration,
}

impl HttpUploader {
    /// Create an uploader; `timeout` bounds download plus store write.
    pub fn new(client: Client, store: Arc<dyn ObjectStore>, timeout: Duration) -> Self {
        Self {
            client,
            store,
            timeout,
        }
    }

    async fn transfer(&self, source_url: &str, destination_key: &str) -> Result<String, TransferError> {
        let response = self
            .client
            .get(source_url)
            .send()
            .await
            .map_err(|e| TransferError::request(source_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Download {
                url: source_url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransferError::request(source_url, e))?;

        self.store
            .put_object(destination_key, bytes.to_vec(), content_type.as_deref())
            .await
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(
        &self,
        source_url: &str,
        destination_key: &str,
    ) -> Result<String, TransferError> {
        match tokio::time::timeout(self.timeout, self.transfer(source_url, destination_key)).await {
            Ok(result) => result,
            Err(_) => Err(TransferError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
    }
}
