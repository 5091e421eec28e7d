//! Shared test utilities for the nc-stream workspace.
//!
//! This crate provides common testing infrastructure including:
//! - NetCDF fixture builders returning raw file bytes
//! - An in-memory object store seeded with fixtures
//! - Skip macros for tests that need network access
//! - Float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{require_network, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Environment variable that enables tests hitting public S3 buckets.
pub const NETWORK_TESTS_ENV: &str = "NC_STREAM_NETWORK_TESTS";

/// Whether network tests were requested for this run.
pub fn network_tests_enabled() -> bool {
    std::env::var(NETWORK_TESTS_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Macro to skip a test unless network tests are enabled.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_network;
///
/// #[tokio::test]
/// async fn test_public_bucket() {
///     require_network!();
///     // Test code hitting S3...
/// }
/// ```
///
/// If `NC_STREAM_NETWORK_TESTS` is not set to `1`, the test prints a skip
/// message and returns early.
#[macro_export]
macro_rules! require_network {
    () => {{
        if !$crate::network_tests_enabled() {
            eprintln!(
                "SKIPPED: network test. Set {}=1 to run it.",
                $crate::NETWORK_TESTS_ENV
            );
            return;
        }
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_fixture_bytes_are_hdf5() {
        let bytes = simple_dataset_bytes();
        assert!(bytes.starts_with(b"\x89HDF\r\n\x1a\n"));
    }

    #[tokio::test]
    async fn test_seeded_store_serves_objects() {
        let store = seeded_store(vec![(TEST_KEY, b"abc".to_vec())]).await;
        let bytes = store
            .get(&object_store::path::Path::parse(TEST_KEY).unwrap())
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), b"abc");
    }
}
