//! # lulcview Colormap
//!
//! Palettes, raster-to-RGBA rendering and legends.
//!
//! A [`PaletteSpec`] is the single source for both a layer's rendering and
//! its legend, so swatches always equal the rendered colours.
//!
//! ## Usage
//!
//! ```ignore
//! use lulcview_colormap::{visualize_palette, ColorScheme};
//!
//! let image = visualize_palette(&ndvi, &ColorScheme::Ndvi.palette()?)?;
//! ```

mod legend;
mod render;
mod scheme;

pub use legend::{
    land_cover_legend, ndmi_legend, ndvi_legend, side_panel_legends, Legend, LegendEntry,
};
pub use render::{palette_to_bands, raster_to_rgba, visualize_palette, visualize_rgb, RgbStretch};
pub use scheme::{
    ColorScheme, ColorStop, PaletteSpec, Rgb, LAND_COVER_CLASSES, LAND_COVER_COLORS, NDMI_COLORS,
    NDVI_COLORS,
};
