//! Error types for streaming requests.

use netcdf_parser::DecodeError;
use storage::FetchError;
use thiserror::Error;

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Category of a [`StreamError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad request parameters; nothing was fetched
    InvalidArgument,
    /// The object does not exist
    NotFound,
    /// Transport failure or decode failure
    Runtime,
}

/// Failure of a streaming request.
///
/// Each variant is produced by exactly one stage: validation, fetch or
/// decode.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("S3 object not found: {location}")]
    NotFound {
        location: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to fetch NetCDF from {location} (engine='{engine}', group='{group}')")]
    Fetch {
        location: String,
        engine: String,
        group: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to open NetCDF from {location} (engine='{engine}', group='{group}'): {source}")]
    Decode {
        location: String,
        engine: String,
        group: String,
        #[source]
        source: DecodeError,
    },

    /// The blocking runtime or the decode task could not run
    #[error("failed to run request for {location}: {reason}")]
    Execution { location: String, reason: String },
}

impl StreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Fetch { .. } | Self::Decode { .. } | Self::Execution { .. } => ErrorKind::Runtime,
        }
    }

    /// The `s3://bucket/key` target, absent for validation failures.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::NotFound { location, .. }
            | Self::Fetch { location, .. }
            | Self::Decode { location, .. }
            | Self::Execution { location, .. } => Some(location),
        }
    }

    /// Map a fetch failure, keeping not-found distinct from transport.
    pub(crate) fn from_fetch(
        location: String,
        engine: Option<&str>,
        group: Option<&str>,
        source: FetchError,
    ) -> Self {
        if source.is_not_found() {
            Self::NotFound { location, source }
        } else {
            Self::Fetch {
                location,
                engine: engine.unwrap_or("auto").to_string(),
                group: group.unwrap_or("root").to_string(),
                source,
            }
        }
    }

    pub(crate) fn from_decode(
        location: String,
        engine: Option<&str>,
        group: Option<&str>,
        source: DecodeError,
    ) -> Self {
        Self::Decode {
            location,
            engine: engine.unwrap_or("auto").to_string(),
            group: group.unwrap_or("root").to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn not_found() -> FetchError {
        FetchError::from_store(
            "s3://b/missing.nc",
            object_store::Error::NotFound {
                path: "missing.nc".to_string(),
                source: "NoSuchKey".into(),
            },
        )
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            StreamError::InvalidArgument("x".into()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            StreamError::from_fetch("s3://b/missing.nc".into(), None, None, not_found()).kind(),
            ErrorKind::NotFound
        );
        let decode = StreamError::from_decode(
            "s3://b/k.nc".into(),
            None,
            None,
            DecodeError::GroupNotFound("x".into()),
        );
        assert_eq!(decode.kind(), ErrorKind::Runtime);
    }

    #[test]
    fn test_decode_message_defaults() {
        let err = StreamError::from_decode(
            "s3://b/k.nc".into(),
            None,
            None,
            DecodeError::UnrecognizedFormat { len: 3 },
        );
        let message = err.to_string();
        assert!(message.contains("s3://b/k.nc"));
        assert!(message.contains("engine='auto'"));
        assert!(message.contains("group='root'"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_fetch_message_names_engine_and_group() {
        let transport = FetchError::from_store(
            "s3://b/k.nc",
            object_store::Error::Generic {
                store: "S3",
                source: "connection reset".into(),
            },
        );
        let err = StreamError::from_fetch(
            "s3://b/k.nc".into(),
            Some("h5netcdf"),
            Some("PRODUCT"),
            transport,
        );
        assert_eq!(err.kind(), ErrorKind::Runtime);
        assert_eq!(
            err.to_string(),
            "failed to fetch NetCDF from s3://b/k.nc (engine='h5netcdf', group='PRODUCT')"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_not_found_message_has_location() {
        let err = StreamError::from_fetch("s3://b/missing.nc".into(), None, None, not_found());
        assert_eq!(err.to_string(), "S3 object not found: s3://b/missing.nc");
        assert_eq!(err.location(), Some("s3://b/missing.nc"));
    }
}
