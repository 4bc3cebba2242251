//! GeoTIFF georeferencing read straight from the first IFD.
//!
//! The `tiff` decoder does not hand back private tags, so the header and the
//! first directory are parsed here and the GeoTIFF tags resolved from the
//! buffer: 33550 (ModelPixelScale), 33922 (ModelTiepoint), 34264
//! (ModelTransformation), 34735 (GeoKeyDirectory) and 42113 (GDAL_NODATA).
//! Classic TIFF only.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::GeoTransform;

/// GeoTIFF tag IDs.
pub(crate) mod tags {
    pub const MODEL_PIXEL_SCALE: u16 = 33550;
    pub const MODEL_TIEPOINT: u16 = 33922;
    pub const MODEL_TRANSFORMATION: u16 = 34264;
    pub const GEO_KEY_DIRECTORY: u16 = 34735;
    pub const GDAL_NODATA: u16 = 42113;
}

/// GeoKey IDs.
pub(crate) mod keys {
    pub const GT_MODEL_TYPE: u16 = 1024;
    pub const GT_RASTER_TYPE: u16 = 1025;
    pub const GEOGRAPHIC_TYPE: u16 = 2048;
    pub const PROJECTED_CS_TYPE: u16 = 3072;
    /// "User-defined" marker value
    pub const USER_DEFINED: u16 = 32767;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TiffByteOrder {
    LittleEndian,
    BigEndian,
}

/// One IFD entry with its value bytes resolved.
#[derive(Debug, Clone)]
struct TagEntry<'a> {
    tag: u16,
    type_id: u16,
    count: usize,
    data: &'a [u8],
}

/// Georeferencing found in a GeoTIFF.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoTiffMeta {
    pub transform: Option<GeoTransform>,
    pub crs: Option<CRS>,
    pub nodata: Option<f64>,
}

fn type_byte_size(type_id: u16) -> Option<usize> {
    match type_id {
        1 | 2 | 6 | 7 => Some(1), // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => Some(2),         // SHORT, SSHORT
        4 | 9 | 11 => Some(4),    // LONG, SLONG, FLOAT
        5 | 10 | 12 => Some(8),   // RATIONAL, SRATIONAL, DOUBLE
        _ => None,
    }
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidTiff(reason.into())
}

/// Parse the header and first IFD of `buf` and extract its GeoTIFF tags.
pub fn read_geotiff_meta(buf: &[u8]) -> Result<GeoTiffMeta> {
    let (order, entries) = parse_first_ifd(buf)?;

    let find = |tag: u16| entries.iter().find(|e| e.tag == tag);
    let f64s = |tag: u16| find(tag).map(|e| values_f64(order, e)).unwrap_or_default();

    let transform = geotransform(
        &f64s(tags::MODEL_PIXEL_SCALE),
        &f64s(tags::MODEL_TIEPOINT),
        &f64s(tags::MODEL_TRANSFORMATION),
    );
    let crs = find(tags::GEO_KEY_DIRECTORY).and_then(|e| crs_from_geokeys(&values_u16(order, e)));
    let nodata = find(tags::GDAL_NODATA).and_then(|e| ascii(e).trim().parse::<f64>().ok());

    Ok(GeoTiffMeta {
        transform,
        crs,
        nodata,
    })
}

fn parse_first_ifd(buf: &[u8]) -> Result<(TiffByteOrder, Vec<TagEntry<'_>>)> {
    if buf.len() < 8 {
        return Err(invalid("header too short"));
    }
    let order = match (buf[0], buf[1]) {
        (b'I', b'I') => TiffByteOrder::LittleEndian,
        (b'M', b'M') => TiffByteOrder::BigEndian,
        _ => return Err(invalid("invalid byte order marker")),
    };
    match read_u16(order, &buf[2..4]) {
        42 => {}
        43 => return Err(invalid("BigTIFF georeferencing is not supported")),
        magic => return Err(invalid(format!("expected magic 42, got {}", magic))),
    }

    let ifd = read_u32(order, &buf[4..8]) as usize;
    let count_bytes = buf
        .get(ifd..ifd + 2)
        .ok_or_else(|| invalid(format!("IFD offset {} past end of file", ifd)))?;
    let n = read_u16(order, count_bytes) as usize;
    let table = buf
        .get(ifd + 2..ifd + 2 + n * 12)
        .ok_or_else(|| invalid(format!("IFD with {} entries is truncated", n)))?;

    let mut entries = Vec::with_capacity(n);
    for raw in table.chunks_exact(12) {
        let tag = read_u16(order, &raw[0..2]);
        let type_id = read_u16(order, &raw[2..4]);
        let count = read_u32(order, &raw[4..8]) as usize;
        // Unknown types cannot be sized; no GeoTIFF tag uses them
        let Some(size) = type_byte_size(type_id) else {
            continue;
        };
        let total = size * count;
        let data = if total <= 4 {
            &raw[8..8 + total]
        } else {
            let offset = read_u32(order, &raw[8..12]) as usize;
            buf.get(offset..offset + total)
                .ok_or_else(|| invalid(format!("tag {} value past end of file", tag)))?
        };
        entries.push(TagEntry {
            tag,
            type_id,
            count,
            data,
        });
    }
    Ok((order, entries))
}

/// GeoTransform from ModelPixelScale + ModelTiepoint, or from the
/// ModelTransformation matrix.
fn geotransform(scale: &[f64], tiepoint: &[f64], matrix: &[f64]) -> Option<GeoTransform> {
    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }
    if matrix.len() >= 16 {
        // Row-major 4x4; x = t[3] + col*t[0] + row*t[1], y = t[7] + col*t[4] + row*t[5]
        return Some(GeoTransform {
            origin_x: matrix[3],
            origin_y: matrix[7],
            pixel_width: matrix[0],
            pixel_height: matrix[5],
            row_rotation: matrix[1],
            col_rotation: matrix[4],
        });
    }
    None
}

/// EPSG code from ProjectedCSTypeGeoKey or GeographicTypeGeoKey
fn crs_from_geokeys(dir: &[u16]) -> Option<CRS> {
    // [version, revision, minor, count, (key, location, count, value)...]
    let n = *dir.get(3)? as usize;
    let mut geographic = None;
    for key in dir.get(4..)?.chunks_exact(4).take(n) {
        let (id, location, value) = (key[0], key[1], key[3]);
        if location != 0 || value == 0 || value == keys::USER_DEFINED {
            continue;
        }
        match id {
            keys::PROJECTED_CS_TYPE => return Some(CRS::from_epsg(value as u32)),
            keys::GEOGRAPHIC_TYPE => geographic = Some(CRS::from_epsg(value as u32)),
            _ => {}
        }
    }
    geographic
}

fn values_f64(order: TiffByteOrder, entry: &TagEntry<'_>) -> Vec<f64> {
    match entry.type_id {
        12 => entry.data.chunks_exact(8).map(|b| read_f64(order, b)).collect(),
        11 => entry
            .data
            .chunks_exact(4)
            .map(|b| read_f32(order, b) as f64)
            .collect(),
        _ => Vec::new(),
    }
}

fn values_u16(order: TiffByteOrder, entry: &TagEntry<'_>) -> Vec<u16> {
    match entry.type_id {
        3 => entry.data.chunks_exact(2).map(|b| read_u16(order, b)).collect(),
        _ => Vec::new(),
    }
}

fn ascii(entry: &TagEntry<'_>) -> String {
    let bytes = &entry.data[..entry.count.min(entry.data.len())];
    // TIFF ASCII is null-terminated
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).to_string()
}

// ---- Byte order helpers ----

fn read_u16(order: TiffByteOrder, data: &[u8]) -> u16 {
    match order {
        TiffByteOrder::LittleEndian => LittleEndian::read_u16(data),
        TiffByteOrder::BigEndian => BigEndian::read_u16(data),
    }
}

fn read_u32(order: TiffByteOrder, data: &[u8]) -> u32 {
    match order {
        TiffByteOrder::LittleEndian => LittleEndian::read_u32(data),
        TiffByteOrder::BigEndian => BigEndian::read_u32(data),
    }
}

fn read_f32(order: TiffByteOrder, data: &[u8]) -> f32 {
    match order {
        TiffByteOrder::LittleEndian => LittleEndian::read_f32(data),
        TiffByteOrder::BigEndian => BigEndian::read_f32(data),
    }
}

fn read_f64(order: TiffByteOrder, data: &[u8]) -> f64 {
    match order {
        TiffByteOrder::LittleEndian => LittleEndian::read_f64(data),
        TiffByteOrder::BigEndian => BigEndian::read_f64(data),
    }
}
