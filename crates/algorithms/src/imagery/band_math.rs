//! Band math operations
//!
//! Element-wise raster algebra on one or two bands. Used to scale digital
//! numbers to reflectance and to blend colourised layers with a shading
//! surface.

use crate::maybe_rayon::*;
use crate::util::{build_output, is_nodata_f64};
use lulcview_core::raster::Raster;
use lulcview_core::Result;

/// Binary operations for band math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandMathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Min,
    Max,
}

/// Apply a unary function to every valid cell.
///
/// Nodata cells stay NaN.
///
/// # Example
/// ```ignore
/// let reflectance = band_math(&b4, |dn| dn / 10_000.0)?;
/// ```
pub fn band_math<F>(raster: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    let (rows, cols) = raster.shape();
    let nodata = raster.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let val = unsafe { raster.get_unchecked(row, col) };
                if !is_nodata_f64(val, nodata) {
                    *out = f(val);
                }
            }
            row_data
        })
        .collect();

    build_output(raster, rows, cols, data)
}

/// Divide every valid cell by `factor` (e.g. 10 000 for Sentinel-2 L1C DNs)
pub fn scale_reflectance(raster: &Raster<f64>, factor: f64) -> Result<Raster<f64>> {
    if factor == 0.0 || !factor.is_finite() {
        return Err(lulcview_core::Error::InvalidParameter {
            name: "factor",
            value: factor.to_string(),
            reason: "must be finite and non-zero".into(),
        });
    }
    band_math(raster, |v| v / factor)
}

/// Apply a binary operation between two rasters element-wise.
///
/// Both rasters must have the same dimensions. Nodata in either input
/// produces nodata in the output; division by zero also yields nodata.
pub fn band_math_binary(
    a: &Raster<f64>,
    b: &Raster<f64>,
    op: BandMathOp,
) -> Result<Raster<f64>> {
    a.ensure_same_shape(b)?;

    let (rows, cols) = a.shape();
    let nodata_a = a.nodata();
    let nodata_b = b.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let va = unsafe { a.get_unchecked(row, col) };
                let vb = unsafe { b.get_unchecked(row, col) };

                if is_nodata_f64(va, nodata_a) || is_nodata_f64(vb, nodata_b) {
                    continue;
                }

                *out = match op {
                    BandMathOp::Add => va + vb,
                    BandMathOp::Subtract => va - vb,
                    BandMathOp::Multiply => va * vb,
                    BandMathOp::Divide => {
                        if vb.abs() < 1e-10 {
                            f64::NAN
                        } else {
                            va / vb
                        }
                    }
                    BandMathOp::Min => va.min(vb),
                    BandMathOp::Max => va.max(vb),
                };
            }
            row_data
        })
        .collect();

    build_output(a, rows, cols, data)
}
