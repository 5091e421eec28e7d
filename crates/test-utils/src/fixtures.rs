//! NetCDF fixtures for tests.
//!
//! Every fixture is written with libnetcdf into a scratch directory and read
//! back as raw bytes, ready to be placed in an object store. The scratch
//! file is removed before the bytes are returned.

use std::sync::Arc;

use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::ObjectStore;

use crate::generators::{create_axis, create_packed_grid, create_test_grid};

/// Bucket name used by the stream fixtures.
pub const TEST_BUCKET: &str = "test-bucket";

/// Key of the single-variable fixture.
pub const TEST_KEY: &str = "test.nc";

/// Fill value used by [`packed_dataset_bytes`].
pub const PACKED_FILL: i16 = -999;

/// Scale factor used by [`packed_dataset_bytes`].
pub const PACKED_SCALE: f32 = 0.5;

/// Offset used by [`packed_dataset_bytes`].
pub const PACKED_OFFSET: f32 = 10.0;

/// Build a NetCDF-4 file with `build` and return its bytes.
///
/// Panics on any library error; fixtures are expected to be valid.
pub fn netcdf_bytes<F>(build: F) -> Vec<u8>
where
    F: FnOnce(&mut netcdf::FileMut) -> Result<(), netcdf::Error>,
{
    netcdf_bytes_with(netcdf::Options::NETCDF4, build)
}

/// Like [`netcdf_bytes`], with explicit creation flags (on-disk format).
pub fn netcdf_bytes_with<F>(options: netcdf::Options, build: F) -> Vec<u8>
where
    F: FnOnce(&mut netcdf::FileMut) -> Result<(), netcdf::Error>,
{
    let dir = tempfile::tempdir().expect("create scratch dir");
    let path = dir.path().join("fixture.nc");

    {
        let mut file = netcdf::create_with(&path, options).expect("create fixture file");
        build(&mut file).expect("write fixture contents");
    }

    std::fs::read(&path).expect("read fixture bytes")
}

/// One variable `data = [1, 2, 3]` (int64) along `x`, no groups.
pub fn simple_dataset_bytes() -> Vec<u8> {
    netcdf_bytes(|file| {
        file.add_dimension("x", 3)?;
        let mut data = file.add_variable::<i64>("data", &["x"])?;
        data.put_values(&[1i64, 2, 3], ..)?;
        Ok(())
    })
}

/// A 64-bit offset (CDF-2) file: `temperature` (f64) over coordinate
/// `time = [0, 1, 2, 3]` with a global `title` attribute.
pub fn classic_dataset_bytes() -> Vec<u8> {
    netcdf_bytes_with(netcdf::Options::_64BIT_OFFSET, |file| {
        file.add_attribute("title", "classic fixture")?;
        file.add_dimension("time", 4)?;
        let mut time = file.add_variable::<i32>("time", &["time"])?;
        time.put_attribute("units", "hours since 2024-01-01")?;
        time.put_values(&[0i32, 1, 2, 3], ..)?;
        let mut temperature = file.add_variable::<f64>("temperature", &["time"])?;
        temperature.put_attribute("units", "K")?;
        temperature.put_values(&[280.0f64, 281.5, 283.0, 279.25], ..)?;
        Ok(())
    })
}

/// Root group with `a = [1, 2]` on coordinate `x = [0, 1]`, and group `sub`
/// with `b = [3, 4, 5]` on coordinate `y = [0, 1, 2]`.
pub fn grouped_dataset_bytes() -> Vec<u8> {
    netcdf_bytes(|file| {
        file.add_dimension("x", 2)?;
        let mut x = file.add_variable::<i64>("x", &["x"])?;
        x.put_values(&[0i64, 1], ..)?;
        let mut a = file.add_variable::<i64>("a", &["x"])?;
        a.put_values(&[1i64, 2], ..)?;

        let mut sub = file.add_group("sub")?;
        sub.add_dimension("y", 3)?;
        let mut y = sub.add_variable::<i64>("y", &["y"])?;
        y.put_values(&[0i64, 1, 2], ..)?;
        let mut b = sub.add_variable::<i64>("b", &["y"])?;
        b.put_values(&[3i64, 4, 5], ..)?;
        Ok(())
    })
}

/// A 3x3 int16 grid `counts` packed with scale/offset and a fill value on
/// the diagonal, plus an unpacked float `raw` copy.
pub fn packed_dataset_bytes() -> Vec<u8> {
    netcdf_bytes(|file| {
        file.add_dimension("row", 3)?;
        file.add_dimension("col", 3)?;

        let mut counts = file.add_variable::<i16>("counts", &["row", "col"])?;
        counts.put_attribute("scale_factor", PACKED_SCALE)?;
        counts.put_attribute("add_offset", PACKED_OFFSET)?;
        counts.put_attribute("_FillValue", PACKED_FILL)?;
        counts.put_attribute("units", "mol m-2")?;
        counts.put_values(&create_packed_grid(3, 3, PACKED_FILL), ..)?;

        let mut raw = file.add_variable::<f32>("raw", &["row", "col"])?;
        raw.put_values(&create_test_grid(3, 3), ..)?;
        Ok(())
    })
}

/// A Sentinel-5P-like layout: `PRODUCT` with latitude/longitude and a
/// total-column variable over (scanline, ground_pixel), and a nested
/// `PRODUCT/SUPPORT_DATA` group.
pub fn product_dataset_bytes() -> Vec<u8> {
    netcdf_bytes(|file| {
        let mut product = file.add_group("PRODUCT")?;
        product.add_dimension("scanline", 4)?;
        product.add_dimension("ground_pixel", 5)?;

        let mut scanline = product.add_variable::<f32>("scanline", &["scanline"])?;
        scanline.put_values(&create_axis(4, 0.0, 1.0), ..)?;
        let mut ground_pixel = product.add_variable::<f32>("ground_pixel", &["ground_pixel"])?;
        ground_pixel.put_values(&create_axis(5, 0.0, 1.0), ..)?;

        let dims = ["scanline", "ground_pixel"];
        let mut latitude = product.add_variable::<f32>("latitude", &dims)?;
        latitude.put_attribute("units", "degrees_north")?;
        latitude.put_values(&create_test_grid(5, 4), ..)?;
        let mut longitude = product.add_variable::<f32>("longitude", &dims)?;
        longitude.put_attribute("units", "degrees_east")?;
        longitude.put_values(&create_test_grid(5, 4), ..)?;
        let mut column = product.add_variable::<f32>("carbonmonoxide_total_column", &dims)?;
        column.put_attribute("units", "mol m-2")?;
        column.put_values(&create_test_grid(5, 4), ..)?;

        let mut support = product.add_group("SUPPORT_DATA")?;
        support.add_dimension("corner", 4)?;
        let mut corner = support.add_variable::<i32>("corner", &["corner"])?;
        corner.put_values(&[0i32, 1, 2, 3], ..)?;
        Ok(())
    })
}

/// An in-memory object store holding `objects` (key, bytes). Keys are
/// stored verbatim, the way the fetch path addresses them.
pub async fn seeded_store(objects: Vec<(&str, Vec<u8>)>) -> Arc<dyn ObjectStore> {
    let store = InMemory::new();
    for (key, data) in objects {
        store
            .put(&Path::parse(key).expect("valid object key"), Bytes::from(data).into())
            .await
            .expect("seed in-memory store");
    }
    Arc::new(store)
}
