// SPDX-License-Identifier: AGPL-3.0-or-later

//! Object store backends.
//!
//! [`ObjectStore`] is a closed enum rather than a trait object: there are
//! exactly two backends and the selection happens once at startup, so enum
//! dispatch keeps the call sites simple and the futures `Send` without
//! boxing.

use std::path::{Path, PathBuf};

use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;

use super::{StorageError, StorageResult};
use crate::config::RuntimeConfig;

/// Storage backend selected at startup.
#[derive(Debug, Clone)]
pub enum ObjectStore {
    /// Files under the configured data directory.
    Local(LocalStore),
    /// Objects in an S3 bucket.
    S3(S3Store),
}

impl ObjectStore {
    /// Build the backend the configuration asks for.
    ///
    /// The config resolver guarantees `bucket_name` is present when remote
    /// storage is enabled.
    pub async fn from_config(config: &RuntimeConfig) -> StorageResult<Self> {
        if config.use_remote_storage {
            let bucket = config
                .bucket_name
                .clone()
                .ok_or_else(|| StorageError::Corrupt("remote storage without bucket".into()))?;
            tracing::info!(bucket = %bucket, region = %config.aws_region, "using S3 storage backend");
            Ok(Self::S3(S3Store::new(bucket, &config.aws_region).await))
        } else {
            tracing::info!(dir = %config.data_directory, "using local storage backend");
            Ok(Self::Local(LocalStore::new(&config.data_directory)?))
        }
    }

    /// Fetch an object. Returns `None` when the key does not exist.
    pub async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match self {
            Self::Local(store) => store.get(key),
            Self::S3(store) => store.get(key).await,
        }
    }

    /// Store an object, replacing any previous value.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        match self {
            Self::Local(store) => store.put(key, bytes),
            Self::S3(store) => store.put(key, bytes).await,
        }
    }

    /// Human-readable backend description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Local(store) => format!("local:{}", store.root().display()),
            Self::S3(store) => format!("s3:{}", store.bucket()),
        }
    }

    /// Verify the backend is reachable (bucket exists / directory writable).
    pub async fn probe(&self) -> StorageResult<()> {
        match self {
            Self::Local(store) => store.probe(),
            Self::S3(store) => store.probe().await,
        }
    }
}

// =============================================================================
// Local filesystem backend
// =============================================================================

/// Local filesystem backend. Object keys map to relative paths under the
/// root directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create the backend, ensuring the root directory exists.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn put(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn probe(&self) -> StorageResult<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("data directory missing: {}", self.root.display()),
            )))
        }
    }
}

// =============================================================================
// S3 backend
// =============================================================================

/// S3 object store backend.
///
/// Credentials come from the ambient AWS credential chain (environment,
/// instance role); this service never handles them directly.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub async fn new(bucket: String, region: &str) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: aws_sdk_s3::Client::new(&aws_config),
            bucket,
        }
    }

    /// Build from an existing client, for tests against S3-compatible
    /// endpoints.
    pub fn with_client(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StorageError::S3(e.to_string()))?;
                Ok(Some(data.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(StorageError::S3(service_err.to_string()))
                }
            }
        }
    }

    pub async fn put(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::S3(e.into_service_error().to_string()))?;
        Ok(())
    }

    pub async fn probe(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.into_service_error().to_string()))?;
        Ok(())
    }
}
