//! Rendered 8-bit RGBA layers

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::GeoTransform;

/// A rendered, georeferenced RGBA image.
///
/// Pixels are stored row-major, four bytes per pixel, not premultiplied.
/// Alpha 0 marks pixels with no data (masked, outside the area of interest).
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    rows: usize,
    cols: usize,
    pixels: Vec<u8>,
    transform: GeoTransform,
    crs: Option<CRS>,
}

impl RgbaImage {
    /// Fully transparent image of the given size
    pub fn transparent(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            pixels: vec![0; rows * cols * 4],
            transform: GeoTransform::default(),
            crs: None,
        }
    }

    /// Wrap an existing RGBA buffer
    pub fn from_pixels(rows: usize, cols: usize, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != rows * cols * 4 {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        Ok(Self {
            rows,
            cols,
            pixels,
            transform: GeoTransform::default(),
            crs: None,
        })
    }

    /// Attach georeferencing
    pub fn with_georef(mut self, transform: GeoTransform, crs: Option<CRS>) -> Self {
        self.transform = transform;
        self.crs = crs;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// RGBA quadruple at (row, col)
    pub fn pixel(&self, row: usize, col: usize) -> Result<[u8; 4]> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let i = (row * self.cols + col) * 4;
        Ok([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn set_pixel(&mut self, row: usize, col: usize, rgba: [u8; 4]) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let i = (row * self.cols + col) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
        Ok(())
    }

    /// Number of pixels with non-zero alpha
    pub fn opaque_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_has_no_opaque_pixels() {
        let img = RgbaImage::transparent(4, 5);
        assert_eq!(img.pixels().len(), 80);
        assert_eq!(img.opaque_count(), 0);
    }

    #[test]
    fn pixel_roundtrip() {
        let mut img = RgbaImage::transparent(2, 2);
        img.set_pixel(1, 0, [10, 20, 30, 255]).unwrap();
        assert_eq!(img.pixel(1, 0).unwrap(), [10, 20, 30, 255]);
        assert_eq!(img.opaque_count(), 1);
        assert!(img.pixel(2, 0).is_err());
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(RgbaImage::from_pixels(2, 2, vec![0; 15]).is_err());
        assert!(RgbaImage::from_pixels(2, 2, vec![0; 16]).is_ok());
    }
}
