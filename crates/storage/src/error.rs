//! Error types for object retrieval.

use thiserror::Error;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Failures while acquiring an object's bytes.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Nothing exists at the location
    #[error("object not found: {location}")]
    NotFound {
        location: String,
        #[source]
        source: object_store::Error,
    },

    /// Client construction, network, permission or any other store failure
    #[error("failed to fetch {location}: {source}")]
    Transport {
        location: String,
        #[source]
        source: object_store::Error,
    },

    /// URL is not of the form `s3://bucket/key`
    #[error("invalid object URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Classify a store error for `location`.
    pub fn from_store(location: impl ToString, source: object_store::Error) -> Self {
        match source {
            object_store::Error::NotFound { .. } => Self::NotFound {
                location: location.to_string(),
                source,
            },
            _ => Self::Transport {
                location: location.to_string(),
                source,
            },
        }
    }

    /// The `s3://bucket/key` the failure relates to, when there is one.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::NotFound { location, .. } | Self::Transport { location, .. } => Some(location),
            Self::InvalidUrl(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic(msg: &str) -> object_store::Error {
        object_store::Error::Generic {
            store: "S3",
            source: msg.to_string().into(),
        }
    }

    #[test]
    fn test_not_found_classification() {
        let err = FetchError::from_store(
            "s3://b/k.nc",
            object_store::Error::NotFound {
                path: "k.nc".to_string(),
                source: "NoSuchKey".into(),
            },
        );
        assert!(err.is_not_found());
        assert_eq!(err.location(), Some("s3://b/k.nc"));
        assert_eq!(err.to_string(), "object not found: s3://b/k.nc");
    }

    #[test]
    fn test_other_errors_are_transport() {
        let err = FetchError::from_store("s3://b/k.nc", generic("connection reset"));
        assert!(!err.is_not_found());
        let message = err.to_string();
        assert!(message.contains("s3://b/k.nc"));
        assert!(message.contains("connection reset"));
    }
}
