//! # lulcview Core
//!
//! Core types, traits and I/O for the lulcview comparison tool.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type
//! - `RgbaImage`: Rendered 8-bit RGBA layer with georeferencing
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `CRS`: Coordinate Reference System handling
//! - `AreaOfInterest`: The fixed polygon every query is bounded and clipped by
//! - I/O for GeoTIFF bands and rendered layers

pub mod aoi;
pub mod crs;
pub mod error;
pub mod io;
pub mod raster;

pub use aoi::{AreaOfInterest, BBox};
pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, RgbaImage};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aoi::{AreaOfInterest, BBox};
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement, RgbaImage};
}
