//! Shared helpers for per-pixel kernels

use ndarray::Array2;
use lulcview_core::raster::Raster;
use lulcview_core::{Error, Result};

/// NaN or equal to the raster's declared nodata value
pub(crate) fn is_nodata_f64(value: f64, nodata: Option<f64>) -> bool {
    if value.is_nan() {
        return true;
    }
    match nodata {
        Some(nd) => (value - nd).abs() < f64::EPSILON,
        None => false,
    }
}

/// Wrap row-major `data` in a NaN-nodata raster carrying `template`'s georeferencing
pub(crate) fn build_output<T: lulcview_core::RasterElement>(
    template: &Raster<T>,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
) -> Result<Raster<f64>> {
    let mut output = template.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}
