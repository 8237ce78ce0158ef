//! AWS S3 object store implementation.
//!
//! Also works against S3-compatible services (GCS interoperability, MinIO)
//! through `storage.endpoint_url` and `storage.force_path_style`.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use log::info;

use crate::error::{AppError, Result, TransferError};
use crate::models::StorageConfig;
use crate::storage::{ObjectStore, join_url};

/// S3-backed object store.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base: String,
}

impl S3ObjectStore {
    /// Create a new S3 store instance.
    pub fn new(client: Client, bucket: impl Into<String>, public_base: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_base: public_base.into(),
        }
    }

    /// Create an S3 store from the default credential chain and storage config.
    pub async fn from_config(storage: &StorageConfig) -> Result<Self> {
        if storage.bucket.trim().is_empty() {
            return Err(AppError::config("storage.bucket is empty"));
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &storage.region {
            loader = loader.region(aws_sdk_s3::config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &storage.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        if storage.force_path_style {
            builder = builder.force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        info!(
            "Using S3 bucket {} (public base {})",
            storage.bucket,
            storage.public_base()
        );
        Ok(Self::new(client, &storage.bucket, storage.public_base()))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> std::result::Result<String, TransferError> {
        let len = bytes.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(|e| {
            TransferError::store(key, aws_sdk_s3::error::DisplayErrorContext(e))
        })?;

        info!("Wrote {} bytes to s3://{}/{}", len, self.bucket, key);
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base, key)
    }
}
