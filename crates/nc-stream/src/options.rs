//! Per-request configuration.

use netcdf_parser::{Chunks, DecodeOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storage::StorageOptions;

/// Group holding the science product in Sentinel-5P Level-2 files.
pub const SENTINEL5P_PRODUCT_GROUP: &str = "/PRODUCT";

/// Options for one streaming request.
///
/// Every field defaults to "not set": the root group, engine chosen from
/// the file signature, unsigned S3 access, eager values and no extra
/// decode options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Group path inside the file; `None`, `""` and `"/"` mean the root group
    pub group: Option<String>,
    /// Decoder backend (`netcdf4`, `h5netcdf`, `scipy`); `None` auto-detects
    pub engine: Option<String>,
    /// Forwarded to the S3 client builder
    pub storage_options: StorageOptions,
    /// Forwarded to the decoder
    pub chunks: Option<Chunks>,
    /// Forwarded to the decoder without inspection
    pub decode_options: DecodeOptions,
}

impl StreamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options reading the `/PRODUCT` group of Sentinel-5P files.
    pub fn sentinel5p() -> Self {
        Self::new().group(SENTINEL5P_PRODUCT_GROUP)
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn storage_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.storage_options.insert(key, value);
        self
    }

    pub fn storage_options(mut self, options: StorageOptions) -> Self {
        self.storage_options = options;
        self
    }

    pub fn chunks(mut self, chunks: Chunks) -> Self {
        self.chunks = Some(chunks);
        self
    }

    pub fn decode_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.decode_options.insert(key.into(), value.into());
        self
    }
}
