//! Cloud object storage backend

use super::{Location, Storage};
use crate::error::{Result, TrainerError};
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;
use url::Url;

/// Blocking facade over an async [`ObjectStore`].
///
/// Object keys are taken from the URL path; the bucket is bound when the
/// store is built.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    runtime: Runtime,
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("store", &self.store.to_string())
            .finish()
    }
}

impl ObjectStorage {
    /// Wrap an existing store
    pub fn new(store: Arc<dyn ObjectStore>) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TrainerError::ConfigError(format!("failed to start runtime: {}", e)))?;
        Ok(Self { store, runtime })
    }

    /// Build a store for the bucket named in `url`, with credentials from the environment.
    pub fn from_url(url: &Url) -> Result<Self> {
        let bucket = url
            .host_str()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| TrainerError::ConfigError(format!("missing bucket in {}", url)))?;

        let store: Arc<dyn ObjectStore> = match url.scheme() {
            "gs" => Arc::new(
                GoogleCloudStorageBuilder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| TrainerError::ConfigError(e.to_string()))?,
            ),
            "s3" => Arc::new(
                AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| TrainerError::ConfigError(e.to_string()))?,
            ),
            other => {
                return Err(TrainerError::ConfigError(format!(
                    "unsupported storage scheme '{}' in {}",
                    other, url
                )))
            }
        };

        Self::new(store)
    }

    fn key(location: &Location) -> Result<ObjectPath> {
        match location {
            Location::Object(url) => ObjectPath::from_url_path(url.path())
                .map_err(|e| TrainerError::ConfigError(format!("invalid object key in {}: {}", url, e))),
            Location::Local(path) => Err(TrainerError::ConfigError(format!(
                "object storage cannot serve local path {}",
                path.display()
            ))),
        }
    }
}

impl Storage for ObjectStorage {
    fn read(&self, location: &Location) -> Result<Vec<u8>> {
        let key = Self::key(location)?;
        let bytes = self
            .runtime
            .block_on(async {
                let result = self.store.get(&key).await?;
                result.bytes().await
            })
            .map_err(|e| TrainerError::load(location.to_string(), e))?;
        Ok(bytes.to_vec())
    }

    fn write(&self, location: &Location, bytes: &[u8]) -> Result<()> {
        let key = Self::key(location)?;
        let payload = PutPayload::from(bytes.to_vec());
        self.runtime
            .block_on(self.store.put(&key, payload))
            .map_err(|e| TrainerError::save(location.to_string(), e))?;
        Ok(())
    }

    fn ensure_dir(&self, location: &Location) -> Result<()> {
        // Prefixes come into existence with their first object.
        debug!(prefix = %location, "object store has no directories, nothing to create");
        Self::key(location).map(|_| ())
    }

    fn name(&self) -> &'static str {
        "object_store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn storage() -> ObjectStorage {
        ObjectStorage::new(Arc::new(InMemory::new())).unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let storage = storage();
        let loc = Location::parse("gs://bucket/models/model.joblib").unwrap();
        storage.ensure_dir(&Location::parse("gs://bucket/models").unwrap()).unwrap();
        storage.write(&loc, b"weights").unwrap();
        assert_eq!(storage.read(&loc).unwrap(), b"weights");
    }

    #[test]
    fn test_missing_object_is_load_failure() {
        let loc = Location::parse("gs://bucket/data/missing.csv").unwrap();
        let err = storage().read(&loc).unwrap_err();
        match err {
            TrainerError::LoadFailure { path, .. } => {
                assert_eq!(path, "gs://bucket/data/missing.csv")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_scheme() {
        let url = Url::parse("ftp://host/file.csv").unwrap();
        assert!(matches!(
            ObjectStorage::from_url(&url),
            Err(TrainerError::ConfigError(_))
        ));
    }

    #[test]
    fn test_local_location_rejected() {
        let loc = Location::parse("data.csv").unwrap();
        assert!(matches!(
            storage().read(&loc),
            Err(TrainerError::ConfigError(_))
        ));
    }
}
