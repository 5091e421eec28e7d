//! Pass-through decode options.
//!
//! Callers hand the decoder an open-ended map of option names to JSON
//! values. The entry point forwards it untouched; this module is where the
//! decoder interprets the keys it understands and rejects the rest.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::{DecodeError, DecodeResult};

/// Extra decoder options, keyed by name.
pub type DecodeOptions = BTreeMap<String, Value>;

/// Unpack `scale_factor`/`add_offset` and mask fill values (default `true`).
pub const MASK_AND_SCALE: &str = "mask_and_scale";

/// Variable name, or list of names, to leave out of the dataset.
pub const DROP_VARIABLES: &str = "drop_variables";

/// Decode options after interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedOptions {
    pub mask_and_scale: bool,
    pub drop_variables: BTreeSet<String>,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            mask_and_scale: true,
            drop_variables: BTreeSet::new(),
        }
    }
}

impl ResolvedOptions {
    pub fn from_map(options: &DecodeOptions) -> DecodeResult<Self> {
        let mut resolved = Self::default();

        for (key, value) in options {
            match key.as_str() {
                MASK_AND_SCALE => {
                    resolved.mask_and_scale =
                        value.as_bool().ok_or_else(|| DecodeError::InvalidOption {
                            key: key.clone(),
                            reason: format!("expected a boolean, got {}", value),
                        })?;
                }
                DROP_VARIABLES => {
                    resolved.drop_variables = parse_names(key, value)?;
                }
                _ => return Err(DecodeError::UnsupportedOption(key.clone())),
            }
        }

        Ok(resolved)
    }
}

fn parse_names(key: &str, value: &Value) -> DecodeResult<BTreeSet<String>> {
    let invalid = || DecodeError::InvalidOption {
        key: key.to_string(),
        reason: format!("expected a name or a list of names, got {}", value),
    };

    match value {
        Value::String(name) => Ok(BTreeSet::from([name.clone()])),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}
