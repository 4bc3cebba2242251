//! # lulcview Algorithms
//!
//! Raster algorithms behind the comparison layers.
//!
//! ## Categories
//!
//! - **imagery**: QA60 cloud mask, band math, NDVI/NDMI
//! - **composite**: per-pixel temporal median, mode, mean, max
//! - **terrain**: hillshade
//! - **spatial**: AOI clipping, Web Mercator default projection

pub mod composite;
pub mod imagery;
pub(crate) mod maybe_rayon;
pub mod spatial;
pub mod terrain;
mod util;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::composite::{
        pixel_max, reduce, reduce_bands, temporal_mean, temporal_median, temporal_mode, Reducer,
    };
    pub use crate::imagery::{
        apply_qa_mask, band_math, band_math_binary, ndmi, ndvi, normalized_difference,
        scale_reflectance, BandMathOp, SpectralIndex,
    };
    pub use crate::spatial::{clip_to_aoi, set_default_projection};
    pub use crate::terrain::{hillshade, HillshadeParams};
    pub use lulcview_core::prelude::*;
}
