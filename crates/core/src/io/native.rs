//! Native GeoTIFF reading/writing built on the `tiff` crate.
//!
//! Pixels go through `tiff`; the GeoTIFF tags are read by [`super::geotags`].
//! Scene bands are read as single-band GeoTIFFs; rendered layers are written
//! as 8-bit RGBA GeoTIFFs with the GeoKey directory GIS tools need to place
//! them.

use super::geotags::{keys, read_geotiff_meta, tags};
use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{ColorType, Gray32Float, RGBA8};
use tiff::encoder::{ImageEncoder, TiffEncoder, TiffKind};
use tiff::tags::Tag;

/// Read a single-band GeoTIFF file into a Raster.
///
/// Fails with [`Error::MissingGeoreference`] when the file carries no
/// transform. CRS and nodata come from the GeoKey directory and the
/// GDAL_NODATA tag when present.
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let bytes = std::fs::read(path.as_ref())?;
    decode_geotiff(&bytes)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(data)
}

fn cast_all<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

fn decode_geotiff<T>(bytes: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    let meta = read_geotiff_meta(bytes)?;
    let transform = meta.transform.ok_or(Error::MissingGeoreference)?;

    let mut decoder = Decoder::new(Cursor::new(bytes))
        .map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::F32(buf) => cast_all(buf),
        DecodingResult::F64(buf) => cast_all(buf),
        DecodingResult::U8(buf) => cast_all(buf),
        DecodingResult::U16(buf) => cast_all(buf),
        DecodingResult::U32(buf) => cast_all(buf),
        DecodingResult::I16(buf) => cast_all(buf),
        DecodingResult::I32(buf) => cast_all(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::UnsupportedDataType(format!(
            "expected a single-band image with {} samples, got {}",
            rows * cols,
            data.len()
        )));
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    raster.set_transform(transform);
    raster.set_crs(meta.crs);
    raster.set_nodata(meta.nodata.and_then(num_traits::cast));

    Ok(raster)
}

/// Write a Raster to a single-band 32-bit float GeoTIFF file
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode_geotiff(raster, BufWriter::new(file))
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Write a rendered layer as an 8-bit RGBA GeoTIFF file
pub fn write_rgba_geotiff<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_rgba(image, BufWriter::new(file))
}

/// Write a rendered layer to an in-memory RGBA GeoTIFF buffer
pub fn write_rgba_geotiff_to_buffer(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_rgba(image, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let nodata = raster.nodata().and_then(num_traits::cast::<T, f64>);
    write_geo_tags(&mut image, raster.transform(), raster.crs(), nodata)?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

fn encode_rgba<W>(rgba: &RgbaImage, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = rgba.shape();
    let mut image = encoder
        .new_image::<RGBA8>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    write_geo_tags(&mut image, rgba.transform(), rgba.crs(), None)?;

    image
        .write_data(rgba.pixels())
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

/// GeoKey directory: model type, PixelIsArea, and the EPSG code when known
fn geokey_directory(crs: Option<&CRS>) -> Vec<u16> {
    let epsg = crs.and_then(|c| u16::try_from(c.epsg()).ok());
    let (model_type, crs_key) = match (crs, epsg) {
        (Some(c), Some(code)) if c.is_geographic() => (2, Some((keys::GEOGRAPHIC_TYPE, code))),
        (Some(_), Some(code)) => (1, Some((keys::PROJECTED_CS_TYPE, code))),
        _ => (2, None),
    };

    let mut entries = vec![
        [keys::GT_MODEL_TYPE, 0, 1, model_type],
        [keys::GT_RASTER_TYPE, 0, 1, 1],
    ];
    if let Some((key, code)) = crs_key {
        entries.push([key, 0, 1, code]);
    }

    let mut dir = vec![1, 1, 0, entries.len() as u16];
    dir.extend(entries.into_iter().flatten());
    dir
}

fn write_geo_tags<W, C, K>(
    image: &mut ImageEncoder<'_, W, C, K>,
    gt: &GeoTransform,
    crs: Option<&CRS>,
    nodata: Option<f64>,
) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
    C: ColorType,
    K: TiffKind,
{
    let encoder = image.encoder();

    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    encoder
        .write_tag(Tag::Unknown(tags::MODEL_PIXEL_SCALE), &scale[..])
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    encoder
        .write_tag(Tag::Unknown(tags::MODEL_TIEPOINT), &tiepoint[..])
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    let geokeys = geokey_directory(crs);
    encoder
        .write_tag(Tag::Unknown(tags::GEO_KEY_DIRECTORY), &geokeys[..])
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    if let Some(nodata) = nodata {
        let text = nodata.to_string();
        encoder
            .write_tag(Tag::Unknown(tags::GDAL_NODATA), text.as_str())
            .map_err(|e| Error::Other(format!("Cannot write nodata tag: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_geotiff_meta;
    use approx::assert_relative_eq;

    #[test]
    fn float_band_roundtrip_keeps_transform() {
        let mut band: Raster<f64> = Raster::from_fn(4, 6, |(r, c)| (r * 6 + c) as f64 / 10.0);
        band.set_transform(GeoTransform::new(11.5, -13.4, 0.25, -0.25));

        let buf = write_geotiff_to_buffer(&band).unwrap();
        let back: Raster<f64> = read_geotiff_from_buffer(&buf).unwrap();

        assert_eq!(back.shape(), (4, 6));
        assert_relative_eq!(back.get(3, 5).unwrap(), 2.3, epsilon = 1e-6);
        assert_relative_eq!(back.transform().origin_x, 11.5, epsilon = 1e-9);
        assert_relative_eq!(back.transform().pixel_height, -0.25, epsilon = 1e-9);
    }

    #[test]
    fn crs_and_nodata_roundtrip() {
        let mut band: Raster<f64> = Raster::filled(3, 3, 812.0);
        band.set(0, 0, 0.0).unwrap();
        band.set_transform(GeoTransform::new(399_960.0, 8_400_040.0, 10.0, -10.0));
        band.set_crs(Some(CRS::from_epsg(32733)));
        band.set_nodata(Some(0.0));

        let buf = write_geotiff_to_buffer(&band).unwrap();
        let back: Raster<f64> = read_geotiff_from_buffer(&buf).unwrap();

        assert_eq!(back.crs(), Some(&CRS::from_epsg(32733)));
        assert_eq!(back.nodata(), Some(0.0));
        assert!(back.is_nodata(back.get(0, 0).unwrap()));
        assert_eq!(back.valid_count(), 8);
        assert_relative_eq!(back.transform().origin_y, 8_400_040.0, epsilon = 1e-6);
    }

    #[test]
    fn geographic_crs_roundtrip_from_file() {
        let mut band: Raster<u16> = Raster::filled(2, 2, 1024);
        band.set_transform(GeoTransform::new(12.0, -15.0, 0.25, -0.25));
        band.set_crs(Some(CRS::wgs84()));

        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_geotiff(&band, tmp.path()).unwrap();
        let back: Raster<f64> = read_geotiff(tmp.path()).unwrap();

        assert_eq!(back.crs(), Some(&CRS::wgs84()));
        assert_eq!(back.nodata(), None);
        assert_eq!(back.get(1, 1).unwrap(), 1024.0);
        assert_relative_eq!(back.transform().origin_x, 12.0, epsilon = 1e-12);
        assert_relative_eq!(back.transform().pixel_width, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn plain_tiff_without_georeferencing_is_an_error() {
        let mut buf = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            encoder
                .write_image::<Gray32Float>(2, 2, &[1.0f32, 2.0, 3.0, 4.0])
                .unwrap();
        }
        assert!(matches!(
            read_geotiff_from_buffer::<f64>(&buf),
            Err(Error::MissingGeoreference)
        ));
    }

    #[test]
    fn rgba_layer_writes_to_disk() {
        let mut img = RgbaImage::transparent(3, 3);
        img.set_pixel(1, 1, [65, 155, 223, 255]).unwrap();

        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_rgba_geotiff(&img, tmp.path()).unwrap();

        let len = std::fs::metadata(tmp.path()).unwrap().len();
        assert!(len as usize > 3 * 3 * 4);

        let meta = read_geotiff_meta(&std::fs::read(tmp.path()).unwrap()).unwrap();
        assert_eq!(meta.transform, Some(*img.transform()));
    }
}
