//! Spectral indices
//!
//! Normalized-difference indices over single-band reflectance rasters.

use crate::maybe_rayon::*;
use crate::util::{build_output, is_nodata_f64};
use lulcview_core::raster::Raster;
use lulcview_core::Result;

/// Supported spectral indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectralIndex {
    /// Normalized Difference Vegetation Index
    NDVI,
    /// Normalized Difference Moisture Index
    NDMI,
}

impl SpectralIndex {
    /// Sentinel-2 band names as (positive, negative) operands
    pub fn bands(&self) -> (&'static str, &'static str) {
        match self {
            SpectralIndex::NDVI => ("B8", "B4"),
            SpectralIndex::NDMI => ("B8", "B11"),
        }
    }

    /// Compute this index from the two operand bands
    pub fn compute(&self, a: &Raster<f64>, b: &Raster<f64>) -> Result<Raster<f64>> {
        match self {
            SpectralIndex::NDVI => ndvi(a, b),
            SpectralIndex::NDMI => ndmi(a, b),
        }
    }
}

/// `(band_a - band_b) / (band_a + band_b)`
///
/// Pixels where either band is nodata, or where the sum is zero, are NaN.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    band_a.ensure_same_shape(band_b)?;

    let (rows, cols) = band_a.shape();
    let nodata_a = band_a.nodata();
    let nodata_b = band_b.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                if is_nodata_f64(a, nodata_a) || is_nodata_f64(b, nodata_b) {
                    continue;
                }

                let sum = a + b;
                if sum == 0.0 {
                    continue;
                }

                *out = (a - b) / sum;
            }
            row_data
        })
        .collect();

    build_output(band_a, rows, cols, data)
}

/// `NDVI = (NIR - Red) / (NIR + Red)`, Sentinel-2 B8 and B4
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}

/// `NDMI = (NIR - SWIR1) / (NIR + SWIR1)`, Sentinel-2 B8 and B11
///
/// Negative values indicate bare soil, values near zero water stress, and
/// high positive values a full canopy without water stress.
pub fn ndmi(nir: &Raster<f64>, swir: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, swir)
}
