//! Object storage locations (S3, GCS, Azure, local)

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectMeta, ObjectStore, PutOptions, PutPayload};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Credentials for remote object stores
///
/// Anything left unset falls back to the environment read by the
/// `object_store` builders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageCredentials {
    /// AWS access key id
    #[serde(default)]
    pub aws_access_key_id: Option<String>,
    /// AWS secret access key
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,
    /// AWS region
    #[serde(default)]
    pub aws_region: Option<String>,
    /// Custom S3-compatible endpoint
    #[serde(default)]
    pub aws_endpoint: Option<String>,
}

impl StorageCredentials {
    /// Load credentials from a JSON secrets file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read secrets file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parse credentials from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("Invalid secrets JSON: {e}")))
    }

    /// Whether an explicit key pair is present
    pub fn has_keys(&self) -> bool {
        self.aws_access_key_id.is_some() && self.aws_secret_access_key.is_some()
    }
}

/// A location inside an object store: the store plus a key prefix
#[derive(Clone)]
pub struct Storage {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Bucket/container name, or the root directory for local stores
    bucket: String,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// Original URL scheme for logging
    scheme: String,
}

impl Storage {
    /// Parse a location URL using credentials from the environment
    pub fn parse(url: &str) -> Result<Self> {
        Self::parse_with_credentials(url, &StorageCredentials::default())
    }

    /// Parse a location URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3 (or S3-compatible with an endpoint)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/`, `./path/` or `file:///path` - Local filesystem
    pub fn parse_with_credentials(url: &str, credentials: &StorageCredentials) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            Self::parse_s3(rest, credentials)
        } else if let Some(rest) = url.strip_prefix("gs://") {
            Self::parse_gcs(rest)
        } else if let Some(rest) = url.strip_prefix("az://") {
            Self::parse_azure(rest)
        } else if url.contains("://") && !url.starts_with("file://") {
            Err(Error::invalid_value(
                "location",
                format!("unsupported storage scheme in '{url}'"),
            ))
        } else {
            Self::parse_local(url)
        }
    }

    /// Wrap an existing store
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        scheme: impl Into<String>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            prefix: normalize_prefix(&prefix.into()),
            scheme: scheme.into(),
        }
    }

    /// In-memory store, used by tests and dry runs
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemory::new()), "memory", "", "")
    }

    fn parse_s3(without_scheme: &str, credentials: &StorageCredentials) -> Result<Self> {
        let (bucket, prefix) = split_bucket(without_scheme, "s3")?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(key) = &credentials.aws_access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &credentials.aws_secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(region) = &credentials.aws_region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &credentials.aws_endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create s3 client: {e}")))?;

        Ok(Self::from_store(Arc::new(store), "s3", bucket, prefix))
    }

    fn parse_gcs(without_scheme: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(without_scheme, "gs")?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self::from_store(Arc::new(store), "gs", bucket, prefix))
    }

    fn parse_azure(without_scheme: &str) -> Result<Self> {
        let (container, prefix) = split_bucket(without_scheme, "az")?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self::from_store(Arc::new(store), "az", container, prefix))
    }

    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self::from_store(Arc::new(store), "file", path, ""))
    }

    /// Check if this is a cloud location (not local or in-memory)
    pub fn is_cloud(&self) -> bool {
        !matches!(self.scheme.as_str(), "file" | "memory")
    }

    /// Get the scheme (s3, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Key prefix of this location, without slashes at either end
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Same store, prefix extended by `sub`
    #[must_use]
    pub fn child(&self, sub: &str) -> Self {
        Self {
            store: Arc::clone(&self.store),
            bucket: self.bucket.clone(),
            prefix: normalize_prefix(&join_key(&self.prefix, sub)),
            scheme: self.scheme.clone(),
        }
    }

    /// Object path of a key relative to this location
    pub fn path(&self, key: &str) -> ObjectPath {
        ObjectPath::from(join_key(&self.prefix, key))
    }

    /// Human readable URL of a path, for logging
    pub fn display_path(&self, path: &ObjectPath) -> String {
        format!("{}://{}/{path}", self.scheme, self.bucket.trim_end_matches('/'))
    }

    /// List objects below `sub_prefix` whose name ends with `suffix`
    ///
    /// Paths are returned sorted so callers see a stable order.
    pub async fn list(&self, sub_prefix: &str, suffix: &str) -> Result<Vec<ObjectPath>> {
        let key = join_key(&self.prefix, sub_prefix);
        let prefix = (!key.is_empty()).then(|| ObjectPath::from(key));

        let objects: Vec<ObjectMeta> = self.store.list(prefix.as_ref()).try_collect().await?;

        let mut paths: Vec<ObjectPath> = objects
            .into_iter()
            .map(|meta| meta.location)
            .filter(|location| location.as_ref().ends_with(suffix))
            .collect();
        paths.sort();

        debug!(
            "Listed {} objects under {}",
            paths.len(),
            self.display_path(&prefix.unwrap_or_default())
        );
        Ok(paths)
    }

    /// Metadata probe; true when an object exists at `key`
    pub async fn exists(&self, key: &str) -> Result<bool> {
        match self.store.head(&self.path(key)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a whole object
    pub async fn get(&self, path: &ObjectPath) -> Result<Bytes> {
        let result = self.store.get(path).await?;
        Ok(result.bytes().await?)
    }

    /// Write bytes to a key relative to this location
    ///
    /// Returns the full URL for logging.
    pub async fn put(&self, key: &str, data: Bytes) -> Result<String> {
        let path = self.path(key);
        self.put_path(&path, data).await?;
        Ok(self.display_path(&path))
    }

    /// Write bytes to an absolute object path
    pub async fn put_path(&self, path: &ObjectPath, data: Bytes) -> Result<()> {
        let payload = PutPayload::from(data);

        // Local stores reject object attributes
        if self.is_cloud() {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, "application/octet-stream".into());
            let opts = PutOptions {
                attributes,
                ..PutOptions::default()
            };
            self.store.put_opts(path, payload, opts).await?;
        } else {
            self.store.put(path, payload).await?;
        }
        Ok(())
    }

    /// Delete an object
    pub async fn delete(&self, path: &ObjectPath) -> Result<()> {
        self.store.delete(path).await?;
        Ok(())
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("scheme", &self.scheme)
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}/{}",
            self.scheme,
            self.bucket.trim_end_matches('/'),
            self.prefix
        )
    }
}

/// Split `bucket/some/prefix` into its bucket and prefix
fn split_bucket<'a>(without_scheme: &'a str, scheme: &str) -> Result<(&'a str, String)> {
    let (bucket, prefix) = match without_scheme.find('/') {
        Some(idx) => (
            &without_scheme[..idx],
            without_scheme[idx + 1..].to_string(),
        ),
        None => (without_scheme, String::new()),
    };

    if bucket.is_empty() {
        return Err(Error::config(format!(
            "Invalid {scheme} URL: missing bucket in '{scheme}://{without_scheme}'"
        )));
    }
    Ok((bucket, prefix))
}

/// Join two key fragments with a single slash
pub(crate) fn join_key(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let key = key.trim_matches('/');
    match (prefix.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{key}"),
    }
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_matches('/').to_string()
}
