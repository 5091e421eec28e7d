//! Byte retrieval for NetCDF objects held in object storage.
//!
//! Provides:
//! - Object addressing (`s3://bucket/key`)
//! - Storage options forwarded to the S3 client builder
//! - A [`ByteSource`] trait with an S3 implementation and one backed by
//!   pre-built stores

pub mod error;
pub mod location;
pub mod object_store;
pub mod options;

pub use self::object_store::{get_object, object_path, ByteSource, MountedStores, S3Source};
pub use error::{FetchError, FetchResult};
pub use location::ObjectLocation;
pub use options::StorageOptions;
