//! The streaming entry point: validate, fetch, decode.

use bytes::Bytes;
use netcdf_parser::{decode_bytes, Dataset, DecodeRequest};
use storage::{ByteSource, ObjectLocation, S3Source};
use tracing::{debug, info, instrument};

use crate::error::{StreamError, StreamResult};
use crate::options::StreamOptions;
use crate::validate::validate_request;

/// Streams NetCDF objects from a [`ByteSource`] into [`Dataset`]s.
///
/// Holds no per-request state; one streamer can serve any number of
/// concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct NetCdfStreamer<S = S3Source> {
    source: S,
}

impl NetCdfStreamer<S3Source> {
    /// A streamer reading from Amazon S3.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: ByteSource> NetCdfStreamer<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch `s3://{bucket}/{key}` and decode it.
    ///
    /// Validation runs first and fails without any I/O. The object is read
    /// whole with a single request and decoded from memory; the buffer is
    /// released when decoding finishes, whatever the outcome.
    #[instrument(skip(self, options), fields(group = ?options.group, engine = ?options.engine))]
    pub async fn stream(
        &self,
        bucket: &str,
        key: &str,
        options: &StreamOptions,
    ) -> StreamResult<Dataset> {
        validate_request(bucket, key)?;

        let location = ObjectLocation::new(bucket, key);
        let uri = location.to_string();

        let bytes = self
            .source
            .fetch(&location, &options.storage_options)
            .await
            .map_err(|e| {
                StreamError::from_fetch(
                    uri.clone(),
                    options.engine.as_deref(),
                    options.group.as_deref(),
                    e,
                )
            })?;
        debug!(location = %uri, size = bytes.len(), "Fetched object");

        let task_uri = uri.clone();
        let task_options = options.clone();
        let dataset = tokio::task::spawn_blocking(move || decode(&task_uri, bytes, &task_options))
            .await
            .map_err(|e| StreamError::Execution {
                location: uri.clone(),
                reason: e.to_string(),
            })??;

        info!(
            location = %uri,
            group = dataset.group(),
            variables = dataset.variables().len(),
            "Streamed NetCDF dataset"
        );
        Ok(dataset)
    }

    /// Blocking form of [`stream`](Self::stream).
    ///
    /// Runs the request on a fresh current-thread runtime. Called from
    /// within a tokio runtime it fails with [`StreamError::Execution`]
    /// instead of blocking a worker; use [`stream`](Self::stream) there.
    pub fn stream_blocking(
        &self,
        bucket: &str,
        key: &str,
        options: &StreamOptions,
    ) -> StreamResult<Dataset> {
        validate_request(bucket, key)?;

        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(StreamError::Execution {
                location: ObjectLocation::new(bucket, key).to_string(),
                reason: "blocking call made from within an async runtime; use NetCdfStreamer::stream"
                    .to_string(),
            });
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StreamError::Execution {
                location: ObjectLocation::new(bucket, key).to_string(),
                reason: format!("failed to start runtime: {}", e),
            })?;

        runtime.block_on(self.stream(bucket, key, options))
    }
}

/// Stream a NetCDF object from a public S3 bucket, blocking the caller.
///
/// Must be called outside any tokio runtime; see
/// [`NetCdfStreamer::stream_blocking`].
///
/// ```no_run
/// use nc_stream::{stream_netcdf, StreamOptions};
///
/// # fn main() -> Result<(), nc_stream::StreamError> {
/// let ds = stream_netcdf(
///     "meeo-s5p",
///     "NRTI/L2__CO____/2024/01/01/S5P_NRTI_L2__CO_____20240101T000000.nc",
///     &StreamOptions::sentinel5p().storage_option("region", "eu-central-1"),
/// )?;
/// println!("{}", ds);
/// # Ok(())
/// # }
/// ```
pub fn stream_netcdf(bucket: &str, key: &str, options: &StreamOptions) -> StreamResult<Dataset> {
    NetCdfStreamer::new().stream_blocking(bucket, key, options)
}

fn decode(uri: &str, bytes: Bytes, options: &StreamOptions) -> StreamResult<Dataset> {
    let engine = options.engine.as_deref();
    let group = options.group.as_deref();

    let request = DecodeRequest {
        name: uri,
        engine,
        group,
        chunks: options.chunks.as_ref(),
        options: &options.decode_options,
    };

    decode_bytes(&bytes, &request)
        .map_err(|e| StreamError::from_decode(uri.to_string(), engine, group, e))
}
