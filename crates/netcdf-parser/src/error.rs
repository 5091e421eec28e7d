//! Error types for NetCDF decoding operations.

use thiserror::Error;

/// Result type for NetCDF decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Error types for in-memory NetCDF decoding.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The buffer does not start with any known NetCDF/HDF5 signature
    #[error("unrecognized file signature ({len} bytes read)")]
    UnrecognizedFormat { len: usize },

    /// Engine name is not one of the supported backends
    #[error("unknown engine '{0}' (expected one of: netcdf4, h5netcdf, scipy)")]
    UnknownEngine(String),

    /// Engine cannot read the detected on-disk format
    #[error("engine '{engine}' cannot read {format} files")]
    EngineMismatch { engine: String, format: String },

    /// Requested group does not exist in the file
    #[error("group '{0}' not found")]
    GroupNotFound(String),

    /// Decode option key is not understood by the decoder
    #[error("unsupported decode option '{0}' (supported: mask_and_scale, drop_variables)")]
    UnsupportedOption(String),

    /// Decode option value has the wrong shape
    #[error("invalid value for decode option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    /// Chunk specification could not be interpreted
    #[error("invalid chunks: {0}")]
    InvalidChunks(String),

    /// Values read from a variable do not match its declared shape
    #[error("variable '{name}' has {actual} values for shape {shape:?}")]
    ShapeMismatch {
        name: String,
        shape: Vec<usize>,
        actual: usize,
    },

    /// Error raised by libnetcdf
    #[error("netCDF library error: {0}")]
    Library(#[from] netcdf::Error),
}
