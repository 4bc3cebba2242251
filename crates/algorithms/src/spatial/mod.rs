//! Spatial operations: AOI clipping and projection handling

mod clip;
mod projection;
mod utm;

pub use clip::{aoi_mask, clip_to_aoi};
pub use projection::{
    from_lonlat, lonlat_to_web_mercator, set_default_projection, to_lonlat,
    web_mercator_to_lonlat, MAX_LATITUDE,
};
pub use utm::{parse_utm_epsg, utm_to_wgs84, wgs84_to_utm};
