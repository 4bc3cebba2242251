//! Sentinel-2 QA60 cloud masking
//!
//! The QA60 band packs two cloud flags: bit 10 marks opaque clouds and
//! bit 11 marks cirrus. A pixel is clear only when both bits are zero.

use crate::maybe_rayon::*;
use crate::util::{build_output, is_nodata_f64};
use lulcview_core::raster::Raster;
use lulcview_core::Result;

/// QA60 bit for opaque clouds
pub const OPAQUE_CLOUD_BIT: u32 = 1 << 10;
/// QA60 bit for cirrus clouds
pub const CIRRUS_BIT: u32 = 1 << 11;

/// Whether a QA60 value flags neither opaque cloud nor cirrus
pub fn is_clear(qa: u32) -> bool {
    qa & OPAQUE_CLOUD_BIT == 0 && qa & CIRRUS_BIT == 0
}

/// Build a boolean clear-sky mask from a QA60 band.
///
/// Nodata QA pixels are treated as not clear.
pub fn clear_mask(qa: &Raster<f64>) -> Vec<bool> {
    let nodata = qa.nodata();
    qa.data()
        .iter()
        .map(|&v| !is_nodata_f64(v, nodata) && v >= 0.0 && is_clear(v as u32))
        .collect()
}

/// Set every pixel of `band` flagged by `qa` to NaN.
///
/// `band` and `qa` must share a grid.
pub fn apply_qa_mask(band: &Raster<f64>, qa: &Raster<f64>) -> Result<Raster<f64>> {
    band.ensure_same_shape(qa)?;

    let (rows, cols) = band.shape();
    let band_nodata = band.nodata();
    let qa_nodata = qa.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let q = unsafe { qa.get_unchecked(row, col) };
                if is_nodata_f64(q, qa_nodata) || q < 0.0 || !is_clear(q as u32) {
                    continue;
                }
                let v = unsafe { band.get_unchecked(row, col) };
                if !is_nodata_f64(v, band_nodata) {
                    *out = v;
                }
            }
            row_data
        })
        .collect();

    build_output(band, rows, cols, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits() {
        assert!(is_clear(0));
        assert!(is_clear(1 << 9));
        assert!(!is_clear(1024));
        assert!(!is_clear(2048));
        assert!(!is_clear(1024 | 2048));
    }

    #[test]
    fn test_apply_qa_mask() {
        let band = Raster::filled(3, 3, 1200.0);
        let mut qa = Raster::filled(3, 3, 0.0);
        qa.set(0, 0, 1024.0).unwrap();
        qa.set(1, 1, 2048.0).unwrap();
        qa.set(2, 2, 512.0).unwrap();

        let masked = apply_qa_mask(&band, &qa).unwrap();
        assert!(masked.get(0, 0).unwrap().is_nan());
        assert!(masked.get(1, 1).unwrap().is_nan());
        assert_eq!(masked.get(2, 2).unwrap(), 1200.0);
        assert_eq!(masked.get(0, 1).unwrap(), 1200.0);
    }

    #[test]
    fn test_clear_mask_nodata_qa() {
        let mut qa = Raster::filled(2, 2, 0.0);
        qa.set(1, 0, f64::NAN).unwrap();
        let mask = clear_mask(&qa);
        assert_eq!(mask, vec![true, true, false, true]);
    }
}
