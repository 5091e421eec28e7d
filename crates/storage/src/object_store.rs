//! Whole-object retrieval from S3 or any pre-built object store.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3Builder, AmazonS3ConfigKey};
use object_store::{path::Path, ObjectStore};
use tracing::{debug, instrument};

use crate::error::{FetchError, FetchResult};
use crate::location::ObjectLocation;
use crate::options::StorageOptions;

/// Something that can hand back the complete bytes of an object.
///
/// One call is one GET: no retries, no caching.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Fetch the whole object at `location`.
    ///
    /// Fails with [`FetchError::NotFound`] when nothing exists there and
    /// [`FetchError::Transport`] for every other failure.
    async fn fetch(
        &self,
        location: &ObjectLocation,
        options: &StorageOptions,
    ) -> FetchResult<Bytes>;
}

/// Amazon S3, one client per request.
///
/// Configuration comes from the environment (`AWS_*` variables) overlaid
/// with the request's storage options. Requests are unsigned unless
/// credentials are passed or `anon=false` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3Source;

impl S3Source {
    pub fn new() -> Self {
        Self
    }

    /// Build the client used for `location`.
    pub fn build_store(
        location: &ObjectLocation,
        options: &StorageOptions,
    ) -> Result<Arc<dyn ObjectStore>, object_store::Error> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&location.bucket);

        for (key, value) in options.client_options() {
            builder = builder.with_config(AmazonS3ConfigKey::from_str(key)?, value);
        }

        let anonymous = options
            .anonymous()
            .map_err(|value| object_store::Error::Generic {
                store: "S3",
                source: format!("anon must be a boolean, got '{}'", value).into(),
            })?;
        if anonymous {
            builder = builder.with_skip_signature(true);
        }

        debug!(bucket = %location.bucket, anonymous, options = options.len(), "Building S3 client");
        Ok(Arc::new(builder.build()?))
    }
}

#[async_trait]
impl ByteSource for S3Source {
    async fn fetch(
        &self,
        location: &ObjectLocation,
        options: &StorageOptions,
    ) -> FetchResult<Bytes> {
        let store =
            Self::build_store(location, options).map_err(|e| FetchError::from_store(location, e))?;
        get_object(store.as_ref(), location).await
    }
}

/// Pre-built stores keyed by bucket name.
///
/// Storage options are ignored; each store is already configured. A bucket
/// with no store mounted behaves like a missing object.
#[derive(Clone, Default)]
pub struct MountedStores {
    stores: HashMap<String, Arc<dyn ObjectStore>>,
}

impl MountedStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`mount`](Self::mount).
    pub fn with_store(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.mount(bucket, store);
        self
    }

    pub fn mount(&mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) {
        self.stores.insert(bucket.into(), store);
    }

    pub fn buckets(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for MountedStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountedStores")
            .field("buckets", &self.stores.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl ByteSource for MountedStores {
    async fn fetch(
        &self,
        location: &ObjectLocation,
        _options: &StorageOptions,
    ) -> FetchResult<Bytes> {
        let store = self.stores.get(&location.bucket).ok_or_else(|| {
            FetchError::from_store(
                location,
                object_store::Error::NotFound {
                    path: location.key.clone(),
                    source: format!("bucket '{}' is not mounted", location.bucket).into(),
                },
            )
        })?;
        get_object(store.as_ref(), location).await
    }
}

/// Store path for `location.key`, taken verbatim.
///
/// Keys with empty segments (`a//b.nc`) or `.`/`..` segments cannot be
/// addressed and fail as transport errors.
pub fn object_path(location: &ObjectLocation) -> FetchResult<Path> {
    Path::parse(&location.key).map_err(|e| FetchError::from_store(location, e.into()))
}

/// GET `location.key` from `store` and read the full body.
#[instrument(skip(store), fields(bucket = %location.bucket, key = %location.key))]
pub async fn get_object(store: &dyn ObjectStore, location: &ObjectLocation) -> FetchResult<Bytes> {
    let path = object_path(location)?;

    let result = store
        .get(&path)
        .await
        .map_err(|e| FetchError::from_store(location, e))?;

    let bytes = result
        .bytes()
        .await
        .map_err(|e| FetchError::from_store(location, e))?;

    debug!(size = bytes.len(), "Read object");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    async fn store_with(key: &str, data: &'static [u8]) -> Arc<dyn ObjectStore> {
        let store = InMemory::new();
        store
            .put(&Path::parse(key).unwrap(), Bytes::from_static(data).into())
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_mounted_fetch() {
        let stores = MountedStores::new().with_store("b", store_with("dir/a.nc", b"CDF\x01").await);
        let bytes = stores
            .fetch(&ObjectLocation::new("b", "dir/a.nc"), &StorageOptions::new())
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), b"CDF\x01");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let stores = MountedStores::new().with_store("b", store_with("a.nc", b"x").await);
        let err = stores
            .fetch(&ObjectLocation::new("b", "missing.nc"), &StorageOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.location(), Some("s3://b/missing.nc"));
    }

    #[tokio::test]
    async fn test_unmounted_bucket_is_not_found() {
        let err = MountedStores::new()
            .fetch(&ObjectLocation::new("nope", "a.nc"), &StorageOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.location(), Some("s3://nope/a.nc"));
    }

    #[tokio::test]
    async fn test_empty_object_is_returned() {
        let stores = MountedStores::new().with_store("b", store_with("empty.nc", b"").await);
        let bytes = stores
            .fetch(&ObjectLocation::new("b", "empty.nc"), &StorageOptions::new())
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_object_path_keeps_key_verbatim() {
        for key in ["data/run#1.nc", "a~b.nc", "x/[v2].nc4", "S5P_OFFL_L2__NO2.nc"] {
            let path = object_path(&ObjectLocation::new("b", key)).unwrap();
            assert_eq!(path.as_ref(), key);
        }
    }

    #[test]
    fn test_object_path_rejects_empty_segment() {
        let err = object_path(&ObjectLocation::new("b", "dir//a.nc")).unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(err.location(), Some("s3://b/dir//a.nc"));
    }

    #[tokio::test]
    async fn test_mounted_fetch_with_reserved_characters() {
        for key in ["data/run#1.nc", "a~b.nc", "x/[v2].nc4"] {
            let stores = MountedStores::new().with_store("b", store_with(key, b"CDF\x01").await);
            let bytes = stores
                .fetch(&ObjectLocation::new("b", key), &StorageOptions::new())
                .await
                .unwrap();
            assert_eq!(bytes.as_ref(), b"CDF\x01", "key {key}");
        }
    }

    #[test]
    fn test_build_store_anonymous_by_default() {
        let loc = ObjectLocation::new("meeo-s5p", "a.nc");
        let opts = StorageOptions::new().with("region", "eu-central-1");
        assert!(S3Source::build_store(&loc, &opts).is_ok());
    }

    #[test]
    fn test_build_store_rejects_unknown_option() {
        let loc = ObjectLocation::new("b", "a.nc");
        let opts = StorageOptions::new().with("definitely_not_a_key", "1");
        assert!(S3Source::build_store(&loc, &opts).is_err());
    }

    #[tokio::test]
    async fn test_s3_fetch_bad_option_is_transport() {
        let loc = ObjectLocation::new("b", "a.nc");
        let opts = StorageOptions::new().with("anon", "sometimes");
        let err = S3Source::new().fetch(&loc, &opts).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.to_string().contains("s3://b/a.nc"));
    }
}
