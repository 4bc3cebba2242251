//! Raster-to-RGBA rendering.
//!
//! Single-band rasters are rendered through a [`PaletteSpec`]; three-band
//! composites through a linear stretch with optional gamma. Nodata renders
//! fully transparent in both cases.

use crate::scheme::PaletteSpec;
use lulcview_core::raster::{Raster, RasterElement, RgbaImage};
use lulcview_core::{Error, Result};

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Linear stretch `[min, max]` with gamma, applied per channel:
/// `255 · clamp((v − min) / (max − min), 0, 1)^(1/gamma)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbStretch {
    pub min: f64,
    pub max: f64,
    pub gamma: f64,
}

impl RgbStretch {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max, gamma: 1.0 }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.min < self.max) {
            return Err(Error::InvalidParameter {
                name: "stretch",
                value: format!("[{}, {}]", self.min, self.max),
                reason: "min must be less than max".into(),
            });
        }
        if !(self.gamma > 0.0) {
            return Err(Error::InvalidParameter {
                name: "gamma",
                value: self.gamma.to_string(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Stretch one value to a byte
    pub fn apply(&self, v: f64) -> u8 {
        let t = ((v - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        let t = if self.gamma == 1.0 { t } else { t.powf(1.0 / self.gamma) };
        (t * 255.0).round() as u8
    }
}

impl Default for RgbStretch {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

fn valid_value<T: RasterElement>(val: T, nodata: Option<T>) -> Option<f64> {
    if val.is_nodata(nodata) {
        return None;
    }
    val.to_f64().filter(|v| v.is_finite())
}

/// Convert a raster to an RGBA pixel buffer through a palette.
///
/// Returns a `Vec<u8>` of length `rows * cols * 4` in row-major order.
pub fn raster_to_rgba<T: RasterElement>(raster: &Raster<T>, palette: &PaletteSpec) -> Vec<u8> {
    let nodata = raster.nodata();
    let mut rgba = Vec::with_capacity(raster.len() * 4);

    for &val in raster.data().iter() {
        match valid_value(val, nodata) {
            Some(v) => rgba.extend_from_slice(&palette.color_at(v).to_rgba()),
            None => rgba.extend_from_slice(&TRANSPARENT),
        }
    }

    rgba
}

/// Render a single band through `palette` into a georeferenced image
pub fn visualize_palette<T: RasterElement>(
    raster: &Raster<T>,
    palette: &PaletteSpec,
) -> Result<RgbaImage> {
    let (rows, cols) = raster.shape();
    let image = RgbaImage::from_pixels(rows, cols, raster_to_rgba(raster, palette))?;
    Ok(image.with_georef(*raster.transform(), raster.crs().cloned()))
}

/// Colourise a band through `palette` into three float channels in 0..=255.
///
/// Nodata cells are NaN in all three channels. Used when a colourised
/// image takes part in further band math before it is rendered.
pub fn palette_to_bands<T: RasterElement>(
    raster: &Raster<T>,
    palette: &PaletteSpec,
) -> [Raster<f64>; 3] {
    let nodata = raster.nodata();
    let (rows, cols) = raster.shape();
    let mut bands: [Raster<f64>; 3] = std::array::from_fn(|_| {
        let mut b = raster.with_same_meta::<f64>(rows, cols);
        b.set_nodata(Some(f64::NAN));
        b
    });

    for ((row, col), &val) in raster.data().indexed_iter() {
        let rgb = match valid_value(val, nodata) {
            Some(v) => {
                let c = palette.color_at(v);
                [c.r as f64, c.g as f64, c.b as f64]
            }
            None => [f64::NAN; 3],
        };
        for (band, v) in bands.iter_mut().zip(rgb) {
            band.data_mut()[(row, col)] = v;
        }
    }

    bands
}

/// Render three bands as RGB with a linear stretch and gamma.
///
/// A pixel is transparent if any of the three bands is nodata there.
pub fn visualize_rgb(bands: [&Raster<f64>; 3], stretch: &RgbStretch) -> Result<RgbaImage> {
    stretch.validate()?;
    let [r, g, b] = bands;
    r.ensure_same_shape(g)?;
    r.ensure_same_shape(b)?;

    let (rows, cols) = r.shape();
    let mut pixels = Vec::with_capacity(rows * cols * 4);

    for ((&vr, &vg), &vb) in r.data().iter().zip(g.data().iter()).zip(b.data().iter()) {
        match (
            valid_value(vr, r.nodata()),
            valid_value(vg, g.nodata()),
            valid_value(vb, b.nodata()),
        ) {
            (Some(vr), Some(vg), Some(vb)) => {
                pixels.extend_from_slice(&[stretch.apply(vr), stretch.apply(vg), stretch.apply(vb), 255])
            }
            _ => pixels.extend_from_slice(&TRANSPARENT),
        }
    }

    let image = RgbaImage::from_pixels(rows, cols, pixels)?;
    Ok(image.with_georef(*r.transform(), r.crs().cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{ColorScheme, Rgb};
    use lulcview_core::GeoTransform;

    #[test]
    fn raster_to_rgba_basic() {
        let r = Raster::from_vec(vec![0.0, 0.5, 1.0, f64::NAN], 2, 2).unwrap();
        let palette = PaletteSpec::from_strs(&["000000", "ffffff"], 0.0, 1.0).unwrap();
        let rgba = raster_to_rgba(&r, &palette);

        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[128, 128, 128, 255]);
        assert_eq!(&rgba[8..12], &[255, 255, 255, 255]);
        assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn integer_nodata_is_transparent() {
        let mut labels: Raster<u8> = Raster::from_vec(vec![0, 6, 255], 1, 3).unwrap();
        labels.set_nodata(Some(255));
        let palette = ColorScheme::LandCover.palette().unwrap();

        let img = visualize_palette(&labels, &palette).unwrap();
        assert_eq!(img.pixel(0, 0).unwrap(), Rgb::new(0x41, 0x9b, 0xdf).to_rgba());
        assert_eq!(img.pixel(0, 1).unwrap(), Rgb::new(0xc4, 0x28, 0x1b).to_rgba());
        assert_eq!(img.pixel(0, 2).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn visualize_keeps_georef() {
        let mut r = Raster::filled(2, 3, 0.2);
        r.set_transform(GeoTransform::new(11.5, -13.4, 0.1, -0.1));
        let img = visualize_palette(&r, &ColorScheme::Ndvi.palette().unwrap()).unwrap();
        assert_eq!(img.shape(), (2, 3));
        assert_eq!(img.transform(), r.transform());
    }

    #[test]
    fn stretch_with_gamma() {
        let s = RgbStretch::new(0.0, 0.35).with_gamma(0.83);
        assert_eq!(s.apply(0.0), 0);
        assert_eq!(s.apply(0.35), 255);
        assert_eq!(s.apply(1.0), 255);
        let expected = (0.5f64.powf(1.0 / 0.83) * 255.0).round() as u8;
        assert_eq!(s.apply(0.175), expected);
        assert!(expected < 128);
    }

    #[test]
    fn visualize_rgb_masks_partial_nodata() {
        let r = Raster::from_vec(vec![0.1, 0.2], 1, 2).unwrap();
        let g = Raster::from_vec(vec![0.1, f64::NAN], 1, 2).unwrap();
        let b = Raster::from_vec(vec![0.4, 0.2], 1, 2).unwrap();

        let img = visualize_rgb([&r, &g, &b], &RgbStretch::new(0.0, 0.4)).unwrap();
        assert_eq!(img.pixel(0, 0).unwrap(), [64, 64, 255, 255]);
        assert_eq!(img.pixel(0, 1).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn visualize_rgb_rejects_bad_stretch() {
        let r = Raster::filled(1, 1, 0.1);
        assert!(visualize_rgb([&r, &r, &r], &RgbStretch::new(1.0, 0.0)).is_err());
        assert!(visualize_rgb([&r, &r, &r], &RgbStretch::new(0.0, 1.0).with_gamma(0.0)).is_err());
    }

    #[test]
    fn palette_bands_match_palette() {
        let labels = Raster::from_vec(vec![1.0, f64::NAN], 1, 2).unwrap();
        let [r, g, b] = palette_to_bands(&labels, &ColorScheme::LandCover.palette().unwrap());
        assert_eq!(r.get(0, 0).unwrap(), 0x39 as f64);
        assert_eq!(g.get(0, 0).unwrap(), 0x7d as f64);
        assert_eq!(b.get(0, 0).unwrap(), 0x49 as f64);
        assert!(r.get(0, 1).unwrap().is_nan());
    }
}
