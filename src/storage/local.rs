//! Local filesystem object store.
//!
//! Stands in for the bucket during development and tests. Keys map to paths
//! below the root directory:
//!
//! ```text
//! {root}/
//! └── images/
//!     ├── 3301.jpg
//!     └── child_unknown.jpg
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::error::TransferError;
use crate::storage::{ObjectStore, join_url};
use crate::utils::fs::write_atomic;

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root_dir: PathBuf,
    public_base: Option<String>,
}

impl LocalObjectStore {
    /// Create a store rooted at the given directory, serving `file://` URLs.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            public_base: None,
        }
    }

    /// Create a store whose objects are served from `public_base`.
    pub fn with_public_base(root_dir: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            public_base: Some(public_base.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a key, refusing keys that escape the root.
    fn path(&self, key: &str) -> Result<PathBuf, TransferError> {
        let relative = Path::new(key.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(TransferError::store(key, "key is not a relative object path"));
        }
        Ok(self.root_dir.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<String, TransferError> {
        let path = self.path(key)?;
        write_atomic(&path, &bytes)
            .await
            .map_err(|e| TransferError::store(key, e))?;

        log::debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_base {
            Some(base) => join_url(base, key),
            None => {
                let path = self.root_dir.join(key.trim_start_matches('/'));
                let absolute = std::path::absolute(&path).unwrap_or(path);
                Url::from_file_path(&absolute)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| absolute.display().to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_and_read_back() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::with_public_base(tmp.path(), "https://cdn.test/media");

        let url = store
            .put_object("images/1.jpg", b"jpeg".to_vec(), Some("image/jpeg"))
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.test/media/images/1.jpg");
        let data = std::fs::read(tmp.path().join("images/1.jpg")).unwrap();
        assert_eq!(data, b"jpeg");
    }

    #[tokio::test]
    async fn test_duplicate_write_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path());

        store.put_object("images/1.jpg", b"old".to_vec(), None).await.unwrap();
        store.put_object("images/1.jpg", b"new".to_vec(), None).await.unwrap();

        let data = std::fs::read(tmp.path().join("images/1.jpg")).unwrap();
        assert_eq!(data, b"new");
    }

    #[tokio::test]
    async fn test_rejects_escaping_key() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path());

        let err = store
            .put_object("../outside.jpg", b"x".to_vec(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Store { .. }));
    }

    #[test]
    fn test_file_url_without_public_base() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path());
        let url = store.public_url("images/1.jpg");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("images/1.jpg"));
    }
}
