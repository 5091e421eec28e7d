//! Object addressing.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FetchError, FetchResult};

/// A bucket plus key, rendered as `s3://bucket/key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an `s3://bucket/key` URL.
    pub fn parse(url: &str) -> FetchResult<Self> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        if parsed.scheme() != "s3" {
            return Err(FetchError::InvalidUrl(format!(
                "{}: expected the s3:// scheme",
                url
            )));
        }

        let bucket = parsed
            .host_str()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| FetchError::InvalidUrl(format!("{}: missing bucket", url)))?;
        let key = parsed.path().trim_start_matches('/');
        if key.is_empty() {
            return Err(FetchError::InvalidUrl(format!("{}: missing key", url)));
        }

        Ok(Self::new(bucket, key))
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let loc = ObjectLocation::new("meeo-s5p", "NRTI/L2__CO____/2024/01/01/S5P.nc");
        assert_eq!(loc.to_string(), "s3://meeo-s5p/NRTI/L2__CO____/2024/01/01/S5P.nc");
    }

    #[test]
    fn test_parse_roundtrip() {
        let loc = ObjectLocation::parse("s3://test-bucket/dir/test.nc").unwrap();
        assert_eq!(loc.bucket, "test-bucket");
        assert_eq!(loc.key, "dir/test.nc");
        assert_eq!(loc.to_string(), "s3://test-bucket/dir/test.nc");
    }

    #[test]
    fn test_parse_rejects_bad_urls() {
        for url in [
            "https://bucket/key.nc",
            "s3://bucket",
            "s3://bucket/",
            "not a url",
        ] {
            let err = ObjectLocation::parse(url).unwrap_err();
            assert!(matches!(err, FetchError::InvalidUrl(_)), "{}", url);
        }
    }
}
