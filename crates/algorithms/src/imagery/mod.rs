//! Imagery algorithms
//!
//! - Cloud masking from the Sentinel-2 QA60 band
//! - Normalized-difference indices: NDVI, NDMI
//! - Band math: unary and binary raster algebra

mod band_math;
mod cloud_mask;
mod indices;

pub use band_math::{band_math, band_math_binary, scale_reflectance, BandMathOp};
pub use cloud_mask::{apply_qa_mask, clear_mask, is_clear, CIRRUS_BIT, OPAQUE_CLOUD_BIT};
pub use indices::{ndmi, ndvi, normalized_difference, SpectralIndex};
