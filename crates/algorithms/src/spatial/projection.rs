//! Spherical Web Mercator (EPSG:3857), UTM, and default-projection assignment
//!
//! Web Mercator uses the WGS84 semi-major axis sphere, as web map tiles do.
//! UTM zones use the ellipsoidal formulas in [`super::utm`].

use super::utm::{parse_utm_epsg, utm_to_wgs84, wgs84_to_utm};
use lulcview_core::raster::{GeoTransform, Raster};
use lulcview_core::{Error, Result, CRS};
use std::f64::consts::PI;

const A: f64 = 6_378_137.0;
/// Latitude limit of the square Web Mercator world
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// WGS84 lon/lat degrees to Web Mercator metres
pub fn lonlat_to_web_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = A * lon.to_radians();
    let y = A * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Web Mercator metres to WGS84 lon/lat degrees
pub fn web_mercator_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / A).to_degrees();
    let lat = (2.0 * (y / A).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Convert a point in `crs` to WGS84 lon/lat.
///
/// Geographic WGS84, Web Mercator and the WGS84 UTM zones are understood;
/// a missing CRS is taken as WGS84.
pub fn to_lonlat(crs: Option<&CRS>, x: f64, y: f64) -> Result<(f64, f64)> {
    match crs.map(|c| c.epsg()) {
        None | Some(4326) => Ok((x, y)),
        Some(3857) => Ok(web_mercator_to_lonlat(x, y)),
        Some(code) => match parse_utm_epsg(code) {
            Some((zone, north)) => Ok(utm_to_wgs84(x, y, zone, north)),
            None => Err(unsupported(code)),
        },
    }
}

/// Convert WGS84 lon/lat to a point in `crs`
pub fn from_lonlat(crs: &CRS, lon: f64, lat: f64) -> Result<(f64, f64)> {
    match crs.epsg() {
        4326 => Ok((lon, lat)),
        3857 => Ok(lonlat_to_web_mercator(lon, lat)),
        code => match parse_utm_epsg(code) {
            Some((zone, north)) => Ok(wgs84_to_utm(lon, lat, zone, north)),
            None => Err(unsupported(code)),
        },
    }
}

fn unsupported(code: u32) -> Error {
    Error::Algorithm(format!(
        "unsupported CRS EPSG:{} (expected 4326, 3857 or a WGS84 UTM zone)",
        code
    ))
}

/// Assign a default projection and nominal scale to a raster.
///
/// The grid is not resampled: the upper-left corner is re-expressed in
/// `crs` and each cell is declared `scale` map units wide, so neighbourhood
/// operations that follow (hillshade) see `scale`-sized cells. Targets are
/// the CRSs [`from_lonlat`] understands.
pub fn set_default_projection(raster: &Raster<f64>, crs: CRS, scale: f64) -> Result<Raster<f64>> {
    if scale <= 0.0 || !scale.is_finite() {
        return Err(Error::InvalidParameter {
            name: "scale",
            value: scale.to_string(),
            reason: "must be a positive number of map units".into(),
        });
    }

    let gt = raster.transform();
    let (lon, lat) = to_lonlat(raster.crs(), gt.origin_x, gt.origin_y)?;
    let (origin_x, origin_y) = from_lonlat(&crs, lon, lat)?;

    let mut out = raster.clone();
    out.set_transform(GeoTransform::new(origin_x, origin_y, scale, -scale));
    out.set_crs(Some(crs));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_maps_to_zero() {
        let (x, y) = lonlat_to_web_mercator(0.0, 0.0);
        assert_relative_eq!(x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_known_point() {
        // 180°E is half the equatorial circumference
        let (x, _) = lonlat_to_web_mercator(180.0, 0.0);
        assert_relative_eq!(x, PI * A, epsilon = 1e-6);
    }

    #[test]
    fn test_inverse() {
        let (x, y) = lonlat_to_web_mercator(13.8356, -17.4275);
        let (lon, lat) = web_mercator_to_lonlat(x, y);
        assert_relative_eq!(lon, 13.8356, epsilon = 1e-9);
        assert_relative_eq!(lat, -17.4275, epsilon = 1e-9);
        assert!(y < 0.0);
    }

    #[test]
    fn test_set_default_projection() {
        let mut r = Raster::filled(4, 4, 0.5);
        r.set_transform(GeoTransform::new(11.57, -13.39, 0.01, -0.01));
        r.set_crs(Some(CRS::wgs84()));

        let p = set_default_projection(&r, CRS::web_mercator(), 10.0).unwrap();
        assert_eq!(p.crs(), Some(&CRS::web_mercator()));
        assert_relative_eq!(p.cell_size(), 10.0);
        assert_eq!(p.shape(), r.shape());
        assert_eq!(p.get(3, 3).unwrap(), 0.5);

        let (lon, lat) = to_lonlat(p.crs(), p.transform().origin_x, p.transform().origin_y).unwrap();
        assert_relative_eq!(lon, 11.57, epsilon = 1e-9);
        assert_relative_eq!(lat, -13.39, epsilon = 1e-9);
    }

    #[test]
    fn test_set_default_projection_rejects_bad_input() {
        let r = Raster::filled(2, 2, 0.5);
        assert!(set_default_projection(&r, CRS::web_mercator(), 0.0).is_err());
        assert!(set_default_projection(&r, CRS::from_epsg(2154), 10.0).is_err());
    }

    #[test]
    fn test_utm_points_convert_to_lonlat() {
        let utm33s = CRS::from_epsg(32733);
        let (x, y) = from_lonlat(&utm33s, 12.7, -15.4).unwrap();
        assert!(x > 100_000.0 && y > 8_000_000.0);

        let (lon, lat) = to_lonlat(Some(&utm33s), x, y).unwrap();
        assert_relative_eq!(lon, 12.7, epsilon = 1e-6);
        assert_relative_eq!(lat, -15.4, epsilon = 1e-6);
        assert!(to_lonlat(Some(&CRS::from_epsg(2154)), x, y).is_err());
    }

    #[test]
    fn test_set_default_projection_from_utm() {
        let utm33s = CRS::from_epsg(32733);
        let (x, y) = from_lonlat(&utm33s, 12.0, -15.0).unwrap();
        let mut r = Raster::filled(3, 3, 1.0);
        r.set_transform(GeoTransform::new(x, y, 10.0, -10.0));
        r.set_crs(Some(utm33s));

        let p = set_default_projection(&r, CRS::web_mercator(), 10.0).unwrap();
        let (lon, lat) = to_lonlat(p.crs(), p.transform().origin_x, p.transform().origin_y).unwrap();
        assert_relative_eq!(lon, 12.0, epsilon = 1e-6);
        assert_relative_eq!(lat, -15.0, epsilon = 1e-6);
    }
}
