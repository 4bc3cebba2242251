//! Hillshade (shaded relief) calculation
//!
//! Treats any continuous surface as elevation and shades it for a given
//! illumination direction. Border cells replicate their nearest interior
//! neighbour so the whole grid gets a value.

use crate::maybe_rayon::*;
use crate::util::{build_output, is_nodata_f64};
use lulcview_core::raster::Raster;
use lulcview_core::{Error, Result};
use std::f64::consts::PI;

/// Parameters for hillshade calculation
#[derive(Debug, Clone)]
pub struct HillshadeParams {
    /// Sun azimuth in degrees (0 = North, clockwise)
    pub azimuth: f64,
    /// Sun altitude in degrees above horizon (0-90)
    pub altitude: f64,
    /// Z-factor for vertical exaggeration
    pub z_factor: f64,
    /// Output range: false = 0-255, true = 0.0-1.0
    pub normalized: bool,
}

impl Default for HillshadeParams {
    fn default() -> Self {
        Self {
            azimuth: 270.0,
            altitude: 45.0,
            z_factor: 1.0,
            normalized: false,
        }
    }
}

/// Calculate hillshade of a surface
///
/// Horn's method on a 3x3 window. Nodata cells stay NaN; a nodata neighbour
/// is replaced by the centre value.
///
/// # Returns
/// Raster with hillshade values (0-255 or 0.0-1.0)
pub fn hillshade(surface: &Raster<f64>, params: HillshadeParams) -> Result<Raster<f64>> {
    if !(0.0..=90.0).contains(&params.altitude) {
        return Err(Error::InvalidParameter {
            name: "altitude",
            value: params.altitude.to_string(),
            reason: "must be between 0 and 90 degrees".into(),
        });
    }
    let cell_size = surface.cell_size();
    if cell_size <= 0.0 || !cell_size.is_finite() {
        return Err(Error::InvalidParameter {
            name: "cell_size",
            value: cell_size.to_string(),
            reason: "surface must have a positive cell size".into(),
        });
    }

    let (rows, cols) = surface.shape();
    let nodata = surface.nodata();

    let azimuth_rad = (360.0 - params.azimuth + 90.0).to_radians();
    let zenith_rad = (90.0 - params.altitude).to_radians();
    let cos_zenith = zenith_rad.cos();
    let sin_zenith = zenith_rad.sin();

    let eight_cell_size = 8.0 * cell_size / params.z_factor;

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let e = unsafe { surface.get_unchecked(row, col) };
                if is_nodata_f64(e, nodata) {
                    continue;
                }

                let at = |dr: isize, dc: isize| -> f64 {
                    let r = (row as isize + dr).clamp(0, rows as isize - 1) as usize;
                    let c = (col as isize + dc).clamp(0, cols as isize - 1) as usize;
                    let v = unsafe { surface.get_unchecked(r, c) };
                    if is_nodata_f64(v, nodata) {
                        e
                    } else {
                        v
                    }
                };

                let a = at(-1, -1);
                let b = at(-1, 0);
                let c = at(-1, 1);
                let d = at(0, -1);
                let f = at(0, 1);
                let g = at(1, -1);
                let h = at(1, 0);
                let i = at(1, 1);

                let dz_dx = ((c + 2.0 * f + i) - (a + 2.0 * d + g)) / eight_cell_size;
                let dz_dy = ((g + 2.0 * h + i) - (a + 2.0 * b + c)) / eight_cell_size;

                let slope_rad = (dz_dx * dz_dx + dz_dy * dz_dy).sqrt().atan();

                let aspect_rad = if dz_dx.abs() < 1e-10 && dz_dy.abs() < 1e-10 {
                    0.0
                } else {
                    let aspect = (-dz_dy).atan2(-dz_dx);
                    if aspect < 0.0 {
                        2.0 * PI + aspect
                    } else {
                        aspect
                    }
                };

                // cos(zenith) * cos(slope) + sin(zenith) * sin(slope) * cos(azimuth - aspect)
                let shade = cos_zenith * slope_rad.cos()
                    + sin_zenith * slope_rad.sin() * (azimuth_rad - aspect_rad).cos();

                let shade_clamped = shade.clamp(0.0, 1.0);

                *out = if params.normalized {
                    shade_clamped
                } else {
                    (shade_clamped * 255.0).round()
                };
            }

            row_data
        })
        .collect();

    build_output(surface, rows, cols, output_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lulcview_core::GeoTransform;

    fn ramp() -> Raster<f64> {
        let mut s = Raster::from_fn(10, 10, |(row, col)| (row + col) as f64 * 10.0);
        s.set_transform(GeoTransform::new(0.0, 100.0, 10.0, -10.0));
        s
    }

    #[test]
    fn test_hillshade_range() {
        let result = hillshade(&ramp(), HillshadeParams::default()).unwrap();
        for &val in result.data().iter() {
            assert!((0.0..=255.0).contains(&val), "value {} out of range", val);
        }
    }

    #[test]
    fn test_hillshade_flat() {
        let mut s: Raster<f64> = Raster::filled(10, 10, 42.0);
        s.set_transform(GeoTransform::new(0.0, 100.0, 10.0, -10.0));

        let result = hillshade(&s, HillshadeParams::default()).unwrap();

        // A flat surface at 45° altitude shades to cos(45°) everywhere, borders included
        let expected = (45f64.to_radians().cos() * 255.0).round();
        assert_eq!(result.get(5, 5).unwrap(), expected);
        assert_eq!(result.get(0, 0).unwrap(), expected);
        assert_eq!(result.get(9, 4).unwrap(), expected);
    }

    #[test]
    fn test_hillshade_west_light_on_west_facing_slope() {
        // Surface rising towards the east faces west, towards a 270° sun
        let mut s = Raster::from_fn(5, 5, |(_, col)| col as f64 * 10.0);
        s.set_transform(GeoTransform::new(0.0, 50.0, 10.0, -10.0));

        let lit = hillshade(&s, HillshadeParams::default()).unwrap();
        let flat_value = (45f64.to_radians().cos() * 255.0).round();
        assert!(lit.get(2, 2).unwrap() > flat_value);

        let east_sun = HillshadeParams {
            azimuth: 90.0,
            ..Default::default()
        };
        let shadowed = hillshade(&s, east_sun).unwrap();
        assert!(shadowed.get(2, 2).unwrap() < flat_value);
    }

    #[test]
    fn test_hillshade_nodata() {
        let mut s = ramp();
        s.set(4, 4, f64::NAN).unwrap();
        let result = hillshade(&s, HillshadeParams::default()).unwrap();
        assert!(result.get(4, 4).unwrap().is_nan());
        assert!(!result.get(4, 5).unwrap().is_nan());
    }

    #[test]
    fn test_hillshade_normalized() {
        let params = HillshadeParams {
            normalized: true,
            ..Default::default()
        };
        let result = hillshade(&ramp(), params).unwrap();
        for &val in result.data().iter() {
            assert!((0.0..=1.0).contains(&val));
        }
    }

    #[test]
    fn test_hillshade_rejects_bad_altitude() {
        let params = HillshadeParams {
            altitude: 120.0,
            ..Default::default()
        };
        assert!(hillshade(&ramp(), params).is_err());
    }
}
