//! Object storage holding training input data.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::CollaboratorError;

/// Read access to object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether `bucket` holds at least one object.
    async fn has_objects(&self, bucket: &str) -> Result<bool, CollaboratorError>;

    /// Store name for diagnostics.
    fn name(&self) -> &str;
}

/// Buckets held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    buckets: RwLock<BTreeMap<String, Vec<String>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.buckets.write().entry(bucket.to_string()).or_default();
    }

    /// Add an object key, creating the bucket if needed.
    pub fn put_object(&self, bucket: &str, key: impl Into<String>) {
        self.buckets
            .write()
            .entry(bucket.to_string())
            .or_default()
            .push(key.into());
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn has_objects(&self, bucket: &str) -> Result<bool, CollaboratorError> {
        self.buckets
            .read()
            .get(bucket)
            .map(|keys| !keys.is_empty())
            .ok_or_else(|| CollaboratorError::BucketNotFound(bucket.to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Buckets mapped to directories under a root.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn has_objects(&self, bucket: &str) -> Result<bool, CollaboratorError> {
        let path = self.root.join(bucket);
        if !tokio::fs::try_exists(&path).await? {
            return Err(CollaboratorError::BucketNotFound(bucket.to_string()));
        }

        let mut entries = tokio::fs::read_dir(&path).await?;
        Ok(entries.next_entry().await?.is_some())
    }

    fn name(&self) -> &str {
        "local"
    }
}
