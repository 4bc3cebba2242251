//! I/O for scene bands and rendered layers

mod geotags;
mod native;

pub use geotags::{read_geotiff_meta, GeoTiffMeta};
pub use native::{
    read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer,
    write_rgba_geotiff, write_rgba_geotiff_to_buffer,
};
