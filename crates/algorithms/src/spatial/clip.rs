//! Clipping rasters to the area of interest

use super::projection::to_lonlat;
use crate::maybe_rayon::*;
use crate::util::build_output;
use lulcview_core::raster::{GeoTransform, Raster};
use lulcview_core::{AreaOfInterest, Result, CRS};

/// Row-major mask of cells whose centre falls inside `aoi`.
///
/// Cell centres are converted to lon/lat first when `crs` is projected.
pub fn aoi_mask(
    transform: &GeoTransform,
    crs: Option<&CRS>,
    rows: usize,
    cols: usize,
    aoi: &AreaOfInterest,
) -> Result<Vec<bool>> {
    let masks: Vec<Result<Vec<bool>>> = (0..rows)
        .into_par_iter()
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let (x, y) = transform.pixel_to_geo(col, row);
                    let (lon, lat) = to_lonlat(crs, x, y)?;
                    Ok(aoi.contains(lon, lat))
                })
                .collect::<Result<Vec<bool>>>()
        })
        .collect();

    let mut mask = Vec::with_capacity(rows * cols);
    for row in masks {
        mask.extend(row?);
    }
    Ok(mask)
}

/// Set every cell whose centre lies outside `aoi` to NaN
pub fn clip_to_aoi(raster: &Raster<f64>, aoi: &AreaOfInterest) -> Result<Raster<f64>> {
    let (rows, cols) = raster.shape();
    let mask = aoi_mask(raster.transform(), raster.crs(), rows, cols, aoi)?;

    let data: Vec<f64> = raster
        .data()
        .iter()
        .zip(mask)
        .map(|(&v, inside)| if inside { v } else { f64::NAN })
        .collect();

    build_output(raster, rows, cols, data)
}
