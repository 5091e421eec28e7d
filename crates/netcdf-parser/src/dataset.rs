//! Labeled in-memory dataset produced by the decoder.
//!
//! The model follows the usual NetCDF conventions: named dimensions,
//! variables indexed by those dimensions, and attributes at both levels.
//! A variable is a coordinate when it is one-dimensional along a dimension
//! of the same name.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use ndarray::{ArrayD, Slice};

/// Number of leading values shown by the textual representation.
const PREVIEW_LEN: usize = 6;

/// Applies `$body` to the array inside any numeric variant.
macro_rules! with_numeric {
    ($values:expr, $arr:ident => $body:expr, $other:pat => $fallback:expr) => {
        match $values {
            Values::I8($arr) => $body,
            Values::I16($arr) => $body,
            Values::I32($arr) => $body,
            Values::I64($arr) => $body,
            Values::U8($arr) => $body,
            Values::U16($arr) => $body,
            Values::U32($arr) => $body,
            Values::U64($arr) => $body,
            Values::F32($arr) => $body,
            Values::F64($arr) => $body,
            $other => $fallback,
        }
    };
}

/// Maps the array inside any numeric variant to a new array of the same type.
macro_rules! map_numeric {
    ($values:expr, $arr:ident => $body:expr, $other:pat => $fallback:expr) => {
        match $values {
            Values::I8($arr) => Values::I8($body),
            Values::I16($arr) => Values::I16($body),
            Values::I32($arr) => Values::I32($body),
            Values::I64($arr) => Values::I64($body),
            Values::U8($arr) => Values::U8($body),
            Values::U16($arr) => Values::U16($body),
            Values::U32($arr) => Values::U32($body),
            Values::U64($arr) => Values::U64($body),
            Values::F32($arr) => Values::F32($body),
            Values::F64($arr) => Values::F64($body),
            $other => $fallback,
        }
    };
}

/// Typed n-dimensional values of a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    /// A type with no numeric representation (char, string, compound, ...)
    Unsupported { dtype: String, shape: Vec<usize> },
}

impl Values {
    pub fn dtype(&self) -> &str {
        match self {
            Values::I8(_) => "int8",
            Values::I16(_) => "int16",
            Values::I32(_) => "int32",
            Values::I64(_) => "int64",
            Values::U8(_) => "uint8",
            Values::U16(_) => "uint16",
            Values::U32(_) => "uint32",
            Values::U64(_) => "uint64",
            Values::F32(_) => "float32",
            Values::F64(_) => "float64",
            Values::Unsupported { dtype, .. } => dtype,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_numeric!(self, arr => arr.shape(), Values::Unsupported { shape, .. } => shape.as_slice())
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Values::Unsupported { .. })
    }

    /// All values widened to `f64`, in row-major order.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        with_numeric!(
            self,
            arr => Some(arr.iter().map(|&v| v as f64).collect()),
            Values::Unsupported { .. } => None
        )
    }

    pub fn as_i32(&self) -> Option<&ArrayD<i32>> {
        match self {
            Values::I32(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&ArrayD<i64>> {
        match self {
            Values::I64(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            Values::F32(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&ArrayD<f64>> {
        match self {
            Values::F64(arr) => Some(arr),
            _ => None,
        }
    }

    /// Copy out a hyper-rectangle, one range per axis.
    pub fn slice(&self, ranges: &[Range<usize>]) -> Values {
        map_numeric!(
            self,
            arr => arr
                .slice_each_axis(|ax| Slice::from(ranges[ax.axis.index()].clone()))
                .to_owned(),
            Values::Unsupported { dtype, .. } => Values::Unsupported {
                dtype: dtype.clone(),
                shape: ranges.iter().map(|r| r.len()).collect(),
            }
        )
    }

    fn preview(&self) -> String {
        fn join<T: fmt::Display>(iter: impl Iterator<Item = T>, total: usize) -> String {
            let mut out: Vec<String> = iter.take(PREVIEW_LEN).map(|v| v.to_string()).collect();
            if total > PREVIEW_LEN {
                out.push("...".to_string());
            }
            out.join(" ")
        }

        let total = self.len();
        with_numeric!(self, arr => join(arr.iter(), total), Values::Unsupported { .. } => "...".to_string())
    }
}

/// Attribute value, normalized from the library's many scalar/vector variants.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i64),
    Ints(Vec<i64>),
    Float(f64),
    Floats(Vec<f64>),
    Text(String),
    Texts(Vec<String>),
}

impl AttributeValue {
    /// Numeric value of a scalar (or single-element) attribute.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Ints(v) if v.len() == 1 => Some(v[0] as f64),
            AttributeValue::Floats(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => f.write_str(v),
            AttributeValue::Ints(v) => write!(f, "{:?}", v),
            AttributeValue::Floats(v) => write!(f, "{:?}", v),
            AttributeValue::Texts(v) => f.write_str(&v.join(", ")),
        }
    }
}

/// A named, dimensioned array with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) dims: Vec<String>,
    pub(crate) values: Values,
    pub(crate) attributes: BTreeMap<String, AttributeValue>,
    /// Packing attributes consumed while decoding (scale_factor, _FillValue, ...)
    pub(crate) encoding: BTreeMap<String, AttributeValue>,
    pub(crate) chunks: Option<Vec<Vec<usize>>>,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn dtype(&self) -> &str {
        self.values.dtype()
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn encoding(&self) -> &BTreeMap<String, AttributeValue> {
        &self.encoding
    }

    /// Block sizes per dimension, or `None` when the variable was loaded eagerly.
    pub fn chunks(&self) -> Option<&[Vec<usize>]> {
        self.chunks.as_deref()
    }

    pub fn is_coordinate(&self) -> bool {
        self.dims.len() == 1 && self.dims[0] == self.name
    }

    /// Total number of blocks, 1 for an eagerly loaded variable.
    pub fn num_blocks(&self) -> usize {
        self.chunks
            .as_ref()
            .map(|chunks| chunks.iter().map(Vec::len).product())
            .unwrap_or(1)
    }

    /// Values of one block, addressed by its position along each dimension.
    pub fn block(&self, index: &[usize]) -> Option<Values> {
        let chunks = self.chunks.as_ref()?;
        if index.len() != chunks.len() {
            return None;
        }

        let ranges = chunks
            .iter()
            .zip(index)
            .map(|(sizes, &i)| {
                let size = *sizes.get(i)?;
                let start: usize = sizes[..i].iter().sum();
                Some(start..start + size)
            })
            .collect::<Option<Vec<_>>>()?;

        Some(self.values.slice(&ranges))
    }
}

/// Decoded contents of one group of a NetCDF file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub(crate) group: String,
    pub(crate) dimensions: Vec<(String, usize)>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) attributes: BTreeMap<String, AttributeValue>,
}

impl Dataset {
    /// Absolute path of the decoded group (`/` for the root).
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Dimension names and sizes, in file order.
    pub fn dimensions(&self) -> &[(String, usize)] {
        &self.dimensions
    }

    pub fn dim_len(&self, name: &str) -> Option<usize> {
        self.dimensions
            .iter()
            .find(|(dim, _)| dim == name)
            .map(|(_, len)| *len)
    }

    /// Every variable, coordinates included, in file order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }

    pub fn coords(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| v.is_coordinate())
    }

    pub fn data_vars(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| !v.is_coordinate())
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

fn write_var(f: &mut fmt::Formatter<'_>, marker: &str, var: &Variable, width: usize) -> fmt::Result {
    writeln!(
        f,
        "  {} {:<width$}  ({}) {} {}",
        marker,
        var.name,
        var.dims.join(", "),
        var.dtype(),
        var.values.preview(),
        width = width
    )
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .variables
            .iter()
            .map(|v| v.name.len())
            .chain(self.attributes.keys().map(|k| k.len() + 1))
            .max()
            .unwrap_or(0);

        writeln!(f, "<Dataset>")?;
        writeln!(f, "Group:       {}", self.group)?;
        let dims: Vec<String> = self
            .dimensions
            .iter()
            .map(|(name, len)| format!("{}: {}", name, len))
            .collect();
        writeln!(f, "Dimensions:  ({})", dims.join(", "))?;

        writeln!(f, "Coordinates:")?;
        for var in self.coords() {
            write_var(f, "*", var, width)?;
        }

        writeln!(f, "Data variables:")?;
        let mut any = false;
        for var in self.data_vars() {
            write_var(f, " ", var, width)?;
            any = true;
        }
        if !any {
            writeln!(f, "    *empty*")?;
        }

        if !self.attributes.is_empty() {
            writeln!(f, "Attributes:")?;
            for (name, value) in &self.attributes {
                writeln!(f, "    {:<width$} {}", format!("{}:", name), value, width = width)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn variable(name: &str, dims: &[&str], values: Values) -> Variable {
        Variable {
            name: name.to_string(),
            dims: dims.iter().map(|s| s.to_string()).collect(),
            values,
            attributes: BTreeMap::new(),
            encoding: BTreeMap::new(),
            chunks: None,
        }
    }

    fn sample() -> Dataset {
        let mut attributes = BTreeMap::new();
        attributes.insert("title".to_string(), AttributeValue::Text("demo".to_string()));
        Dataset {
            group: "/".to_string(),
            dimensions: vec![("x".to_string(), 2)],
            variables: vec![
                variable("x", &["x"], Values::I64(arr1(&[0, 1]).into_dyn())),
                variable("a", &["x"], Values::F64(arr1(&[1.5, 2.5]).into_dyn())),
            ],
            attributes,
        }
    }

    #[test]
    fn test_coordinate_split() {
        let ds = sample();
        let coords: Vec<_> = ds.coords().map(|v| v.name()).collect();
        let data: Vec<_> = ds.data_vars().map(|v| v.name()).collect();
        assert_eq!(coords, vec!["x"]);
        assert_eq!(data, vec!["a"]);
        assert_eq!(ds.dim_len("x"), Some(2));
        assert_eq!(ds.dim_len("y"), None);
    }

    #[test]
    fn test_block_extraction() {
        let mut var = variable(
            "grid",
            &["y", "x"],
            Values::I32(arr2(&[[1, 2, 3], [4, 5, 6], [7, 8, 9]]).into_dyn()),
        );
        var.chunks = Some(vec![vec![2, 1], vec![3]]);

        assert_eq!(var.num_blocks(), 2);
        let first = var.block(&[0, 0]).unwrap();
        assert_eq!(first.shape(), &[2, 3]);
        let last = var.block(&[1, 0]).unwrap();
        assert_eq!(
            last.as_i32().unwrap().iter().copied().collect::<Vec<_>>(),
            vec![7, 8, 9]
        );
        assert!(var.block(&[2, 0]).is_none());
        assert!(var.block(&[0]).is_none());
    }

    #[test]
    fn test_eager_variable_has_no_blocks() {
        let var = variable("a", &["x"], Values::U8(arr1(&[1, 2]).into_dyn()));
        assert!(var.chunks().is_none());
        assert!(var.block(&[0]).is_none());
        assert_eq!(var.num_blocks(), 1);
    }

    #[test]
    fn test_values_widening() {
        let values = Values::I16(arr1(&[-1, 2]).into_dyn());
        assert_eq!(values.to_f64_vec(), Some(vec![-1.0, 2.0]));
        let unsupported = Values::Unsupported {
            dtype: "string".to_string(),
            shape: vec![4],
        };
        assert_eq!(unsupported.len(), 4);
        assert_eq!(unsupported.to_f64_vec(), None);
        assert!(!unsupported.is_numeric());
    }

    #[test]
    fn test_attribute_accessors() {
        assert_eq!(AttributeValue::Ints(vec![3]).as_f64(), Some(3.0));
        assert_eq!(AttributeValue::Floats(vec![1.0, 2.0]).as_f64(), None);
        assert_eq!(AttributeValue::Text("K".to_string()).as_str(), Some("K"));
    }

    #[test]
    fn test_display_lists_sections() {
        let text = sample().to_string();
        assert!(text.contains("Dimensions:  (x: 2)"));
        assert!(text.contains("* x"));
        assert!(text.contains("float64 1.5 2.5"));
        assert!(text.contains("title:"));
    }
}
