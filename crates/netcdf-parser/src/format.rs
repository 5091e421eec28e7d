//! File signature sniffing and decoder engine selection.

use std::fmt;
use std::str::FromStr;

use crate::error::{DecodeError, DecodeResult};

/// HDF5 superblock signature.
const HDF5_SIGNATURE: &[u8; 8] = b"\x89HDF\r\n\x1a\n";

/// Smallest user block; larger ones are successive powers of two.
const HDF5_MIN_USER_BLOCK: usize = 512;

/// On-disk layout of a NetCDF object, detected from its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// CDF-1 classic format
    Classic,
    /// CDF-2 64-bit offset format
    Offset64,
    /// CDF-5 64-bit data format
    Cdf5,
    /// NetCDF-4, stored as HDF5
    Hdf5,
}

impl FileFormat {
    /// Detect the format from a file's leading bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() >= 4 && &data[..3] == b"CDF" {
            return match data[3] {
                0x01 => Some(Self::Classic),
                0x02 => Some(Self::Offset64),
                0x05 => Some(Self::Cdf5),
                _ => None,
            };
        }

        hdf5_signature_offsets(data.len())
            .any(|offset| {
                data.get(offset..offset + HDF5_SIGNATURE.len()) == Some(HDF5_SIGNATURE.as_slice())
            })
            .then_some(Self::Hdf5)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Offset64 => "64-bit offset",
            Self::Cdf5 => "CDF-5",
            Self::Hdf5 => "NetCDF-4/HDF5",
        }
    }

    /// Whether the format can hold groups other than the root.
    pub fn supports_groups(&self) -> bool {
        matches!(self, Self::Hdf5)
    }
}

/// Offsets where an HDF5 superblock may start: 0, then 512, 1024, 2048, ...
fn hdf5_signature_offsets(len: usize) -> impl Iterator<Item = usize> {
    std::iter::once(0)
        .chain(std::iter::successors(Some(HDF5_MIN_USER_BLOCK), |&n| n.checked_mul(2)))
        .take_while(move |&offset| offset < len)
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoder backend.
///
/// All engines are served by libnetcdf; they differ in which on-disk
/// formats they accept, mirroring the backends callers know by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// Reads every format libnetcdf understands
    Netcdf4,
    /// HDF5-based files only
    H5netcdf,
    /// Classic and 64-bit offset files only
    Scipy,
}

impl Engine {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Netcdf4 => "netcdf4",
            Self::H5netcdf => "h5netcdf",
            Self::Scipy => "scipy",
        }
    }

    pub fn accepts(&self, format: FileFormat) -> bool {
        match self {
            Self::Netcdf4 => true,
            Self::H5netcdf => format == FileFormat::Hdf5,
            Self::Scipy => matches!(format, FileFormat::Classic | FileFormat::Offset64),
        }
    }

    /// Pick the engine for a buffer.
    ///
    /// With no explicit engine the format decides; an explicit engine must
    /// accept the detected format.
    pub fn resolve(requested: Option<&str>, data: &[u8]) -> DecodeResult<(Engine, FileFormat)> {
        let format = FileFormat::detect(data)
            .ok_or(DecodeError::UnrecognizedFormat { len: data.len() })?;

        let engine = match requested {
            None => match format {
                FileFormat::Hdf5 => Engine::H5netcdf,
                FileFormat::Classic | FileFormat::Offset64 => Engine::Scipy,
                FileFormat::Cdf5 => Engine::Netcdf4,
            },
            Some(name) => name.parse()?,
        };

        if !engine.accepts(format) {
            return Err(DecodeError::EngineMismatch {
                engine: engine.name().to_string(),
                format: format.name().to_string(),
            });
        }

        Ok((engine, format))
    }
}

impl FromStr for Engine {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "netcdf4" => Ok(Self::Netcdf4),
            "h5netcdf" => Ok(Self::H5netcdf),
            "scipy" => Ok(Self::Scipy),
            _ => Err(DecodeError::UnknownEngine(s.to_string())),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
