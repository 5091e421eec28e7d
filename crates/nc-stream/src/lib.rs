//! Stream NetCDF objects from S3 into in-memory labeled datasets.
//!
//! A request goes through three stages, strictly in order, and stops at the
//! first failure:
//!
//! 1. **Validate**: bucket and key must be non-empty and the key must end
//!    in `.nc`, `.nc4` or `.cdf`. No I/O happens before this passes.
//! 2. **Fetch**: the whole object is read with one unsigned GET (see
//!    [`storage::S3Source`]).
//! 3. **Decode**: the bytes are decoded in memory into a
//!    [`Dataset`](netcdf_parser::Dataset), honoring group, engine, chunks and
//!    extra decode options.
//!
//! Failures fall into three kinds ([`ErrorKind`]): invalid argument, not
//! found, and runtime (transport or decode).
//!
//! # Example
//!
//! ```no_run
//! use nc_stream::{NetCdfStreamer, StreamOptions};
//!
//! # async fn run() -> Result<(), nc_stream::StreamError> {
//! let streamer = NetCdfStreamer::new();
//! let ds = streamer
//!     .stream("my-bucket", "path/to/file.nc", &StreamOptions::new().group("sub"))
//!     .await?;
//! for var in ds.data_vars() {
//!     println!("{} {:?}", var.name(), var.shape());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod options;
pub mod stream;
pub mod validate;

pub use error::{ErrorKind, StreamError, StreamResult};
pub use options::{StreamOptions, SENTINEL5P_PRODUCT_GROUP};
pub use stream::{stream_netcdf, NetCdfStreamer};
pub use validate::{validate_request, NETCDF_SUFFIXES};

// Types callers need to build options and read results
pub use netcdf_parser::{AttributeValue, ChunkSize, Chunks, Dataset, DecodeOptions, Values, Variable};
pub use storage::{ByteSource, MountedStores, ObjectLocation, S3Source, StorageOptions};
