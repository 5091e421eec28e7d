//! In-memory NetCDF decoder.
//!
//! Turns the complete bytes of a NetCDF file (classic, 64-bit offset, CDF-5
//! or NetCDF-4/HDF5) into a labeled [`Dataset`] without touching the local
//! filesystem.
//!
//! # Decoding pipeline
//!
//! 1. The file signature is sniffed ([`FileFormat::detect`]) and the engine
//!    resolved against it ([`Engine::resolve`]).
//! 2. libnetcdf opens the buffer with `nc_open_mem`.
//! 3. The requested group is located; `None` means the root group.
//! 4. Dimensions, attributes and every variable's values are copied out,
//!    applying CF packing (`mask_and_scale`) and the requested block layout.
//!
//! ```no_run
//! use netcdf_parser::{decode_bytes, DecodeOptions, DecodeRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("sample.nc")?;
//! let options = DecodeOptions::new();
//! let dataset = decode_bytes(
//!     &bytes,
//!     &DecodeRequest {
//!         name: "sample.nc",
//!         engine: None,
//!         group: Some("/PRODUCT"),
//!         chunks: None,
//!         options: &options,
//!     },
//! )?;
//! println!("{}", dataset);
//! # Ok(())
//! # }
//! ```

pub mod chunks;
pub mod dataset;
pub mod error;
pub mod format;
pub mod native;
pub mod options;

pub use chunks::{ChunkSize, Chunks};
pub use dataset::{AttributeValue, Dataset, Values, Variable};
pub use error::{DecodeError, DecodeResult};
pub use format::{Engine, FileFormat};
pub use native::{decode_bytes, normalize_group, silence_hdf5_errors, DecodeRequest};
pub use options::{DecodeOptions, DROP_VARIABLES, MASK_AND_SCALE};
