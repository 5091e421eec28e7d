//! Request validation, run before any I/O.

use crate::error::{StreamError, StreamResult};

/// Key suffixes accepted as NetCDF objects.
pub const NETCDF_SUFFIXES: [&str; 3] = [".nc", ".nc4", ".cdf"];

/// Reject empty bucket or key and keys without a NetCDF suffix.
///
/// Whitespace-only values count as empty. The suffix match is
/// case-sensitive.
pub fn validate_request(bucket: &str, key: &str) -> StreamResult<()> {
    if bucket.trim().is_empty() || key.trim().is_empty() {
        return Err(StreamError::InvalidArgument(
            "both 'bucket' and 'key' are required".to_string(),
        ));
    }

    if !has_netcdf_suffix(key) {
        return Err(StreamError::InvalidArgument(format!(
            "expected a NetCDF key ending with .nc, .nc4, or .cdf, got '{}'",
            key
        )));
    }

    Ok(())
}

pub fn has_netcdf_suffix(key: &str) -> bool {
    NETCDF_SUFFIXES.iter().any(|suffix| key.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_accepts_all_suffixes() {
        for key in ["a.nc", "dir/a.nc4", "x/y/z.cdf"] {
            assert!(validate_request("bucket", key).is_ok(), "{}", key);
        }
    }

    #[test]
    fn test_rejects_empty_values() {
        for (bucket, key) in [("", "a.nc"), ("b", ""), ("", ""), ("  ", "a.nc"), ("b", " ")] {
            let err = validate_request(bucket, key).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_rejects_other_suffixes() {
        for key in ["file.txt", "a.nc.gz", "a.NC", "nc", "a.h5"] {
            let err = validate_request("b", key).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{}", key);
            assert!(err.to_string().contains(key));
        }
    }
}
