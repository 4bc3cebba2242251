//! Per-pixel reduction of a stack of co-registered rasters
//!
//! Each output cell is computed from the valid (non-NaN, non-nodata) values
//! found at that cell across the stack. Cells with no valid value are NaN.

use crate::maybe_rayon::*;
use crate::util::{build_output, is_nodata_f64};
use lulcview_core::raster::Raster;
use lulcview_core::{Error, Result};

/// Available per-pixel reducers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Median; even counts average the two middle values
    Median,
    /// Most frequent integer value; ties go to the smallest value
    Mode,
    /// Arithmetic mean
    Mean,
    /// Maximum value
    Max,
}

/// Reduce a stack of rasters to one raster.
///
/// All rasters must share the first raster's shape; the output carries the
/// first raster's transform and CRS. An empty stack is an error.
pub fn reduce(stack: &[Raster<f64>], reducer: Reducer) -> Result<Raster<f64>> {
    let first = stack.first().ok_or(Error::EmptySeries("reduce"))?;
    for r in &stack[1..] {
        first.ensure_same_shape(r)?;
    }

    let (rows, cols) = first.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            let mut values: Vec<f64> = Vec::with_capacity(stack.len());

            for (col, out) in row_data.iter_mut().enumerate() {
                values.clear();
                for r in stack {
                    let v = unsafe { r.get_unchecked(row, col) };
                    if !is_nodata_f64(v, r.nodata()) {
                        values.push(v);
                    }
                }

                if values.is_empty() {
                    continue;
                }

                *out = apply(&mut values, reducer);
            }

            row_data
        })
        .collect();

    build_output(first, rows, cols, data)
}

fn apply(values: &mut [f64], reducer: Reducer) -> f64 {
    match reducer {
        Reducer::Median => {
            values.sort_by(|a, b| a.total_cmp(b));
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2.0
            } else {
                values[mid]
            }
        }
        Reducer::Mode => {
            // Sorting groups equal labels into runs; the first longest run
            // is therefore the smallest of the tied labels.
            let mut labels: Vec<i64> = values.iter().map(|v| v.round() as i64).collect();
            labels.sort_unstable();

            let mut best = labels[0];
            let mut best_count = 0;
            let mut i = 0;
            while i < labels.len() {
                let mut j = i;
                while j < labels.len() && labels[j] == labels[i] {
                    j += 1;
                }
                if j - i > best_count {
                    best_count = j - i;
                    best = labels[i];
                }
                i = j;
            }
            best as f64
        }
        Reducer::Mean => values.iter().sum::<f64>() / values.len() as f64,
        Reducer::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Per-pixel median of a stack
pub fn temporal_median(stack: &[Raster<f64>]) -> Result<Raster<f64>> {
    reduce(stack, Reducer::Median)
}

/// Per-pixel mode of a stack of label rasters
pub fn temporal_mode(stack: &[Raster<f64>]) -> Result<Raster<f64>> {
    reduce(stack, Reducer::Mode)
}

/// Per-pixel mean of a stack
pub fn temporal_mean(stack: &[Raster<f64>]) -> Result<Raster<f64>> {
    reduce(stack, Reducer::Mean)
}

/// Per-pixel maximum of a stack (also used across bands of one image)
pub fn pixel_max(stack: &[Raster<f64>]) -> Result<Raster<f64>> {
    reduce(stack, Reducer::Max)
}

/// Reduce each band independently over a series of multi-band images.
///
/// `series[i][b]` is band `b` of image `i`. Every image must carry the same
/// number of bands. Returns one reduced raster per band.
pub fn reduce_bands(series: &[Vec<Raster<f64>>], reducer: Reducer) -> Result<Vec<Raster<f64>>> {
    let first = series.first().ok_or(Error::EmptySeries("reduce_bands"))?;
    let band_count = first.len();
    if let Some(bad) = series.iter().find(|img| img.len() != band_count) {
        return Err(Error::InvalidParameter {
            name: "series",
            value: bad.len().to_string(),
            reason: format!("every image must have {} bands", band_count),
        });
    }

    (0..band_count)
        .map(|b| {
            let stack: Vec<Raster<f64>> = series.iter().map(|img| img[b].clone()).collect();
            reduce(&stack, reducer)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn layer(values: &[f64]) -> Raster<f64> {
        Raster::from_vec(values.to_vec(), 1, values.len()).unwrap()
    }

    #[test]
    fn test_median_odd_and_even() {
        let stack = vec![layer(&[1.0, 4.0]), layer(&[3.0, 2.0]), layer(&[2.0, f64::NAN])];
        let m = temporal_median(&stack).unwrap();
        assert_relative_eq!(m.get(0, 0).unwrap(), 2.0);
        // second column has only 4 and 2
        assert_relative_eq!(m.get(0, 1).unwrap(), 3.0);
    }

    #[test]
    fn test_mode_tie_takes_smallest() {
        let stack = vec![
            layer(&[5.0, 1.0]),
            layer(&[2.0, 1.0]),
            layer(&[5.0, 7.0]),
            layer(&[2.0, 7.0]),
            layer(&[3.0, 7.0]),
        ];
        let m = temporal_mode(&stack).unwrap();
        assert_eq!(m.get(0, 0).unwrap(), 2.0);
        assert_eq!(m.get(0, 1).unwrap(), 7.0);
    }

    #[test]
    fn test_mean_and_max_skip_nodata() {
        let mut b = layer(&[4.0, 9.0]);
        b.set_nodata(Some(9.0));
        let stack = vec![layer(&[2.0, 1.0]), b];

        let mean = temporal_mean(&stack).unwrap();
        assert_relative_eq!(mean.get(0, 0).unwrap(), 3.0);
        assert_relative_eq!(mean.get(0, 1).unwrap(), 1.0);

        let max = pixel_max(&stack).unwrap();
        assert_relative_eq!(max.get(0, 0).unwrap(), 4.0);
        assert_relative_eq!(max.get(0, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_all_nodata_cell_is_nan() {
        let stack = vec![layer(&[f64::NAN]), layer(&[f64::NAN])];
        assert!(temporal_median(&stack).unwrap().get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_empty_stack_errors() {
        assert!(matches!(reduce(&[], Reducer::Mean), Err(Error::EmptySeries(_))));
    }

    #[test]
    fn test_shape_mismatch() {
        let stack = vec![layer(&[1.0, 2.0]), layer(&[1.0])];
        assert!(reduce(&stack, Reducer::Max).is_err());
    }

    #[test]
    fn test_reduce_bands() {
        let series = vec![
            vec![layer(&[0.2]), layer(&[0.6])],
            vec![layer(&[0.4]), layer(&[0.2])],
        ];
        let means = reduce_bands(&series, Reducer::Mean).unwrap();
        assert_eq!(means.len(), 2);
        assert_relative_eq!(means[0].get(0, 0).unwrap(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(means[1].get(0, 0).unwrap(), 0.4, epsilon = 1e-12);

        let ragged = vec![vec![layer(&[0.2])], vec![]];
        assert!(reduce_bands(&ragged, Reducer::Mean).is_err());
    }
}
