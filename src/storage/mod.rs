//! Object store abstractions for mirrored media and run artifacts.
//!
//! Every backend maps a destination key to a stable public URL:
//!
//! ```text
//! {bucket}/
//! ├── images/               # Mirrored post media
//! │   ├── 3301.jpg
//! │   └── 3302.jpg
//! └── pages/                # Scraped JSON and rendered HTML (Lambda runs)
//!     ├── scraped_data_20250301120000.json
//!     └── cms_20250301120000.html
//! ```
//!
//! Writes overwrite on duplicate keys, so re-running a build with the same
//! posts is idempotent at the storage layer.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::TransferError;

// Re-export for convenience
pub use local::LocalObjectStore;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;

/// Trait for object storage backends.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, returning the object's public URL.
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, TransferError>;

    /// Public URL for a key, whether or not it exists yet.
    fn public_url(&self, key: &str) -> String;
}

/// Join a URL base and an object key with exactly one slash.
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(
            join_url("https://storage.googleapis.com/club/", "/images/1.jpg"),
            "https://storage.googleapis.com/club/images/1.jpg"
        );
        assert_eq!(join_url("https://store", "images/1.jpg"), "https://store/images/1.jpg");
    }
}
