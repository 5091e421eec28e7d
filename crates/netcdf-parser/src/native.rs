//! In-memory NetCDF decoding using the native netcdf library.
//!
//! The fetched buffer is handed to libnetcdf through `nc_open_mem`, so no
//! temp file is ever written. The buffer is borrowed only for the duration
//! of [`decode_bytes`]; everything returned is owned.

use std::collections::BTreeMap;
use std::sync::Once;

use ndarray::{ArrayD, IxDyn};
use netcdf::types::{FloatType, IntType, NcVariableType};
use tracing::{debug, trace};

use crate::chunks::Chunks;
use crate::dataset::{AttributeValue, Dataset, Values, Variable};
use crate::error::{DecodeError, DecodeResult};
use crate::format::Engine;
use crate::options::{DecodeOptions, ResolvedOptions};

/// Attributes describing how values were packed on disk.
const PACKING_ATTRIBUTES: [&str; 4] = ["scale_factor", "add_offset", "_FillValue", "missing_value"];

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when looking up a group that
/// doesn't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Gloc.c line 421 in H5G_loc_find(): can't find object
/// ```
///
/// Called automatically before every decode; only the first call does work.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// What to decode and how.
#[derive(Debug, Clone, Copy)]
pub struct DecodeRequest<'a> {
    /// Name for logs (usually the object URI); only its plain file name
    /// reaches libnetcdf
    pub name: &'a str,
    /// Backend name; `None` selects from the file signature
    pub engine: Option<&'a str>,
    /// Group path; `None`, `""` and `"/"` all mean the root group
    pub group: Option<&'a str>,
    /// Block layout to record on every variable
    pub chunks: Option<&'a Chunks>,
    /// Extra options, interpreted here
    pub options: &'a DecodeOptions,
}

/// Decode a complete NetCDF file held in memory.
pub fn decode_bytes(data: &[u8], request: &DecodeRequest<'_>) -> DecodeResult<Dataset> {
    silence_hdf5_errors();

    let options = ResolvedOptions::from_map(request.options)?;
    let (engine, format) = Engine::resolve(request.engine, data)?;
    let group = normalize_group(request.group);

    debug!(
        name = request.name,
        size = data.len(),
        format = %format,
        engine = %engine,
        group = group.unwrap_or("/"),
        "Decoding NetCDF buffer"
    );

    if let Some(path) = group {
        if !format.supports_groups() {
            return Err(DecodeError::GroupNotFound(path.to_string()));
        }
    }

    // libnetcdf parses a URL-like name as a remote dataset and never reads the buffer
    let file = netcdf::open_mem(memory_label(request.name), data)?;

    let reader = GroupReader {
        options: &options,
        chunks: request.chunks,
    };

    match group {
        None => reader.read(
            "/".to_string(),
            file.dimensions(),
            file.variables(),
            file.attributes(),
        ),
        Some(path) => {
            let nc_group = file
                .group(path)?
                .ok_or_else(|| DecodeError::GroupNotFound(path.to_string()))?;
            reader.read(
                format!("/{}", path),
                nc_group.dimensions(),
                nc_group.variables(),
                nc_group.attributes(),
            )
        }
    }
}

/// Strip surrounding slashes; the root group becomes `None`.
pub fn normalize_group(group: Option<&str>) -> Option<&str> {
    group.map(|g| g.trim().trim_matches('/')).filter(|g| !g.is_empty())
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Last path segment of `name`, or `None` when it could still be read as a
/// URL or a mode fragment.
fn memory_label(name: &str) -> Option<&str> {
    name.rsplit('/')
        .next()
        .filter(|label| !label.is_empty())
        .filter(|label| !label.contains(|c: char| matches!(c, ':' | '#' | '?')))
}

struct GroupReader<'o> {
    options: &'o ResolvedOptions,
    chunks: Option<&'o Chunks>,
}

impl GroupReader<'_> {
    fn read<'d, 'v, 'a>(
        &self,
        path: String,
        dimensions: impl Iterator<Item = netcdf::Dimension<'d>>,
        variables: impl Iterator<Item = netcdf::Variable<'v>>,
        attributes: impl Iterator<Item = netcdf::Attribute<'a>>,
    ) -> DecodeResult<Dataset> {
        let mut dims: Vec<(String, usize)> = dimensions
            .map(|dim| (dim.name().to_string(), dim.len()))
            .collect();

        let mut decoded = Vec::new();
        for var in variables {
            let name = var.name().to_string();
            if self.options.drop_variables.contains(&name) {
                trace!(variable = %name, "Dropping variable");
                continue;
            }

            // Dimensions inherited from parent groups are only visible through variables
            for dim in var.dimensions() {
                let dim_name = dim.name().to_string();
                if !dims.iter().any(|(existing, _)| *existing == dim_name) {
                    dims.push((dim_name, dim.len()));
                }
            }

            decoded.push(self.read_variable(&var, name)?);
        }

        Ok(Dataset {
            group: path,
            dimensions: dims,
            variables: decoded,
            attributes: read_attributes(attributes)?,
        })
    }

    fn read_variable(&self, var: &netcdf::Variable<'_>, name: String) -> DecodeResult<Variable> {
        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name().to_string()).collect();
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        let mut attributes = read_attributes(var.attributes())?;
        let mut values = read_values(var, &name, &shape)?;
        let mut encoding = BTreeMap::new();

        if self.options.mask_and_scale && values.is_numeric() {
            let packing: BTreeMap<String, AttributeValue> = PACKING_ATTRIBUTES
                .iter()
                .filter_map(|key| attributes.remove_entry(*key))
                .collect();
            if !packing.is_empty() {
                values = unpack(&values, &packing);
                encoding = packing;
            }
        }

        let chunks = match self.chunks {
            Some(requested) => {
                let on_disk = match requested {
                    Chunks::Preferred => var.chunking()?,
                    _ => None,
                };
                Some(requested.layout(&dims, &shape, on_disk.as_deref()))
            }
            None => None,
        };

        trace!(
            variable = %name,
            dtype = values.dtype(),
            shape = ?shape,
            "Decoded variable"
        );

        Ok(Variable {
            name,
            dims,
            values,
            attributes,
            encoding,
            chunks,
        })
    }
}

fn read_values(var: &netcdf::Variable<'_>, name: &str, shape: &[usize]) -> DecodeResult<Values> {
    let values = match var.vartype() {
        NcVariableType::Int(int) => match int {
            IntType::I8 => Values::I8(to_array(name, shape, var.get_values::<i8, _>(..)?)?),
            IntType::I16 => Values::I16(to_array(name, shape, var.get_values::<i16, _>(..)?)?),
            IntType::I32 => Values::I32(to_array(name, shape, var.get_values::<i32, _>(..)?)?),
            IntType::I64 => Values::I64(to_array(name, shape, var.get_values::<i64, _>(..)?)?),
            IntType::U8 => Values::U8(to_array(name, shape, var.get_values::<u8, _>(..)?)?),
            IntType::U16 => Values::U16(to_array(name, shape, var.get_values::<u16, _>(..)?)?),
            IntType::U32 => Values::U32(to_array(name, shape, var.get_values::<u32, _>(..)?)?),
            IntType::U64 => Values::U64(to_array(name, shape, var.get_values::<u64, _>(..)?)?),
        },
        NcVariableType::Float(FloatType::F32) => {
            Values::F32(to_array(name, shape, var.get_values::<f32, _>(..)?)?)
        }
        NcVariableType::Float(FloatType::F64) => {
            Values::F64(to_array(name, shape, var.get_values::<f64, _>(..)?)?)
        }
        NcVariableType::Char => unsupported("char", shape),
        NcVariableType::String => unsupported("string", shape),
        _ => unsupported("user-defined", shape),
    };

    Ok(values)
}

fn unsupported(dtype: &str, shape: &[usize]) -> Values {
    Values::Unsupported {
        dtype: dtype.to_string(),
        shape: shape.to_vec(),
    }
}

fn to_array<T>(name: &str, shape: &[usize], data: Vec<T>) -> DecodeResult<ArrayD<T>> {
    let actual = data.len();
    ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|_| DecodeError::ShapeMismatch {
        name: name.to_string(),
        shape: shape.to_vec(),
        actual,
    })
}

/// Apply CF packing: fill/missing values become NaN, then `v * scale + offset`.
fn unpack(values: &Values, packing: &BTreeMap<String, AttributeValue>) -> Values {
    let scale = packing
        .get("scale_factor")
        .and_then(AttributeValue::as_f64)
        .unwrap_or(1.0);
    let offset = packing
        .get("add_offset")
        .and_then(AttributeValue::as_f64)
        .unwrap_or(0.0);

    let mut fill_values: Vec<f64> = Vec::new();
    for key in ["_FillValue", "missing_value"] {
        match packing.get(key) {
            Some(AttributeValue::Ints(v)) => fill_values.extend(v.iter().map(|&x| x as f64)),
            Some(AttributeValue::Floats(v)) => fill_values.extend(v.iter().copied()),
            Some(other) => fill_values.extend(other.as_f64()),
            None => {}
        }
    }

    let shape = values.shape().to_vec();
    let raw = values.to_f64_vec().unwrap_or_default();
    let unpacked: Vec<f64> = raw
        .into_iter()
        .map(|v| {
            if v.is_nan() || fill_values.contains(&v) {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect();

    // Shape comes from an array of the same length, so this cannot fail
    match ArrayD::from_shape_vec(IxDyn(&shape), unpacked) {
        Ok(arr) => Values::F64(arr),
        Err(_) => values.clone(),
    }
}

fn read_attributes<'a>(
    attributes: impl Iterator<Item = netcdf::Attribute<'a>>,
) -> DecodeResult<BTreeMap<String, AttributeValue>> {
    attributes
        .map(|attr| Ok((attr.name().to_string(), convert_attribute(attr.value()?))))
        .collect()
}

fn convert_attribute(value: netcdf::AttributeValue) -> AttributeValue {
    use netcdf::AttributeValue as Nc;

    fn ints<T: Into<i64>>(v: Vec<T>) -> AttributeValue {
        AttributeValue::Ints(v.into_iter().map(Into::into).collect())
    }

    match value {
        Nc::Uchar(v) => AttributeValue::Int(v.into()),
        Nc::Schar(v) => AttributeValue::Int(v.into()),
        Nc::Ushort(v) => AttributeValue::Int(v.into()),
        Nc::Short(v) => AttributeValue::Int(v.into()),
        Nc::Uint(v) => AttributeValue::Int(v.into()),
        Nc::Int(v) => AttributeValue::Int(v.into()),
        Nc::Longlong(v) => AttributeValue::Int(v),
        Nc::Ulonglong(v) => i64::try_from(v)
            .map(AttributeValue::Int)
            .unwrap_or(AttributeValue::Float(v as f64)),
        Nc::Float(v) => AttributeValue::Float(v.into()),
        Nc::Double(v) => AttributeValue::Float(v),
        Nc::Str(v) => AttributeValue::Text(v),
        Nc::Uchars(v) => ints(v),
        Nc::Schars(v) => ints(v),
        Nc::Ushorts(v) => ints(v),
        Nc::Shorts(v) => ints(v),
        Nc::Uints(v) => ints(v),
        Nc::Ints(v) => ints(v),
        Nc::Longlongs(v) => AttributeValue::Ints(v),
        Nc::Ulonglongs(v) => match v.iter().map(|&x| i64::try_from(x)).collect::<Result<Vec<i64>, _>>() {
            Ok(ints) => AttributeValue::Ints(ints),
            Err(_) => AttributeValue::Floats(v.into_iter().map(|x| x as f64).collect()),
        },
        Nc::Floats(v) => AttributeValue::Floats(v.into_iter().map(f64::from).collect()),
        Nc::Doubles(v) => AttributeValue::Floats(v),
        Nc::Strs(v) => AttributeValue::Texts(v),
    }
}
