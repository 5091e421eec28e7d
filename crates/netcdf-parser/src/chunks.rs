//! Block layout for chunked variables.
//!
//! A chunk request is forwarded untouched from the caller; this module turns
//! it into a per-dimension list of block sizes for each decoded variable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, DecodeResult};

/// Block size along one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSize {
    /// Blocks of `n` elements, the last one holding the remainder
    Fixed(usize),
    /// A single block spanning the whole dimension
    Full,
}

impl ChunkSize {
    fn from_json(value: &Value) -> DecodeResult<Self> {
        match value.as_i64() {
            Some(-1) => Ok(Self::Full),
            Some(n) if n > 0 => Ok(Self::Fixed(n as usize)),
            _ if value.is_null() => Ok(Self::Full),
            _ => Err(DecodeError::InvalidChunks(format!(
                "expected a positive integer or -1, got {}",
                value
            ))),
        }
    }

    fn blocks(&self, len: usize) -> Vec<usize> {
        match *self {
            Self::Fixed(size) if size < len => {
                let mut blocks = vec![size; len / size];
                if len % size != 0 {
                    blocks.push(len % size);
                }
                blocks
            }
            _ => vec![len],
        }
    }
}

/// Lazy-loading block specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Chunks {
    /// Same block size along every dimension (`-1` means whole dimension)
    Uniform(ChunkSize),
    /// Block sizes for the named dimensions; unnamed dimensions stay whole
    PerDimension(BTreeMap<String, ChunkSize>),
    /// The variable's on-disk chunking, or whole dimensions when it has none
    Preferred,
}

impl Chunks {
    /// Interpret a JSON chunk specification.
    ///
    /// Accepts an integer, `-1`, `"auto"`, or an object of `{dim: n | -1}`.
    pub fn from_json(value: &Value) -> DecodeResult<Self> {
        match value {
            Value::Number(_) => ChunkSize::from_json(value).map(Self::Uniform),
            Value::String(s) if s == "auto" => Ok(Self::Preferred),
            Value::Object(map) if map.is_empty() => Ok(Self::Preferred),
            Value::Object(map) => map
                .iter()
                .map(|(dim, size)| Ok((dim.clone(), ChunkSize::from_json(size)?)))
                .collect::<DecodeResult<BTreeMap<_, _>>>()
                .map(Self::PerDimension),
            other => Err(DecodeError::InvalidChunks(format!(
                "unsupported chunk specification {}",
                other
            ))),
        }
    }

    /// Block sizes per dimension for a variable.
    ///
    /// `on_disk` is the variable's storage chunk shape, used by `Preferred`.
    pub fn layout(
        &self,
        dims: &[String],
        shape: &[usize],
        on_disk: Option<&[usize]>,
    ) -> Vec<Vec<usize>> {
        dims.iter()
            .zip(shape)
            .enumerate()
            .map(|(axis, (dim, &len))| {
                let size = match self {
                    Self::Uniform(size) => *size,
                    Self::PerDimension(map) => map.get(dim).copied().unwrap_or(ChunkSize::Full),
                    Self::Preferred => on_disk
                        .and_then(|chunks| chunks.get(axis))
                        .filter(|&&n| n > 0)
                        .map(|&n| ChunkSize::Fixed(n))
                        .unwrap_or(ChunkSize::Full),
                };
                size.blocks(len)
            })
            .collect()
    }
}

impl TryFrom<Value> for Chunks {
    type Error = DecodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<Chunks> for Value {
    fn from(chunks: Chunks) -> Self {
        fn size_to_json(size: ChunkSize) -> Value {
            match size {
                ChunkSize::Fixed(n) => Value::from(n),
                ChunkSize::Full => Value::from(-1),
            }
        }

        match chunks {
            Chunks::Uniform(size) => size_to_json(size),
            Chunks::PerDimension(map) => Value::Object(
                map.into_iter()
                    .map(|(dim, size)| (dim, size_to_json(size)))
                    .collect(),
            ),
            Chunks::Preferred => Value::from("auto"),
        }
    }
}
