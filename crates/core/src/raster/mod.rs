//! Raster data structures

mod element;
mod geotransform;
mod grid;
mod rgba;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use rgba::RgbaImage;
