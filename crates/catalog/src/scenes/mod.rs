//! Scene sources: where imagery for the recipes comes from.
//!
//! A [`SceneSource`] answers a [`SceneQuery`] with the scenes that pass the
//! date, area and cloud filters, each carrying the requested bands on a
//! common grid.

mod stac;
mod synthetic;

pub use stac::{StacAsset, StacDirectorySource, StacItem, StacItemCollection, StacItemProperties};
pub use synthetic::{SyntheticConfig, SyntheticSource};

use crate::error::{CatalogError, Result};
use crate::years::DateRange;
use chrono::NaiveDate;
use lulcview_core::{AreaOfInterest, BBox, Raster};
use std::collections::HashMap;

/// Sentinel-2 bands the optical recipes read
pub const S2_BANDS: [&str; 5] = ["B4", "B8", "B11", "B12", "QA60"];

/// Dynamic World class-probability bands, in label order
pub const DW_PROBABILITY_BANDS: [&str; 9] = [
    "water",
    "trees",
    "grass",
    "flooded_vegetation",
    "crops",
    "shrub_and_scrub",
    "built",
    "bare",
    "snow_and_ice",
];

/// Dynamic World label band
pub const DW_LABEL_BAND: &str = "label";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Sentinel-2 L1C harmonized
    Sentinel2,
    /// Dynamic World V1
    DynamicWorld,
}

impl Collection {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Sentinel2 => "COPERNICUS/S2_HARMONIZED",
            Self::DynamicWorld => "GOOGLE/DYNAMICWORLD/V1",
        }
    }
}

/// What a recipe asks a source for.
#[derive(Debug, Clone)]
pub struct SceneQuery<'a> {
    pub collection: Collection,
    pub range: DateRange,
    pub aoi: &'a AreaOfInterest,
    /// Keep only scenes whose cloudy-pixel percentage is strictly below this
    pub max_cloud_percentage: Option<f64>,
    pub bands: Vec<&'a str>,
}

impl SceneQuery<'_> {
    /// Date, footprint and cloud filters.
    ///
    /// With a cloud threshold set, a scene without a cloud percentage does
    /// not qualify.
    pub fn accepts(&self, date: NaiveDate, footprint: &BBox, cloud: Option<f64>) -> bool {
        if !self.range.contains(date) || !self.aoi.intersects_bbox(footprint) {
            return false;
        }
        match (self.max_cloud_percentage, cloud) {
            (Some(max), Some(c)) => c < max,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// One acquisition with its bands loaded.
#[derive(Debug, Clone)]
pub struct Scene {
    pub id: String,
    pub date: NaiveDate,
    pub cloud_percentage: Option<f64>,
    bands: HashMap<String, Raster<f64>>,
}

impl Scene {
    pub fn new(id: impl Into<String>, date: NaiveDate, cloud_percentage: Option<f64>) -> Self {
        Self {
            id: id.into(),
            date,
            cloud_percentage,
            bands: HashMap::new(),
        }
    }

    pub fn with_band(mut self, name: impl Into<String>, raster: Raster<f64>) -> Self {
        self.bands.insert(name.into(), raster);
        self
    }

    pub fn band(&self, name: &str) -> Result<&Raster<f64>> {
        self.bands.get(name).ok_or_else(|| CatalogError::MissingBand {
            scene: self.id.clone(),
            band: name.to_string(),
        })
    }

    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.bands.keys().map(String::as_str)
    }
}

/// Check that every listed band of every scene shares the shape, transform
/// and CRS of the first scene's first band.
pub fn ensure_common_grid(scenes: &[Scene], bands: &[&str]) -> Result<()> {
    let Some(first) = scenes.first() else {
        return Ok(());
    };
    let Some(&first_band) = bands.first() else {
        return Ok(());
    };
    let reference = first.band(first_band)?;
    for scene in scenes {
        for &band in bands {
            let raster = scene.band(band)?;
            let mismatch = |detail: String| CatalogError::GridMismatch {
                scene: scene.id.clone(),
                band: band.to_string(),
                detail,
            };
            if raster.shape() != reference.shape() {
                return Err(mismatch(format!(
                    "shape {:?}, expected {:?}",
                    raster.shape(),
                    reference.shape()
                )));
            }
            if !raster.transform().same_grid(reference.transform()) {
                let (x, y) = (raster.transform().origin_x, raster.transform().origin_y);
                let (ex, ey) = (reference.transform().origin_x, reference.transform().origin_y);
                return Err(mismatch(format!(
                    "origin ({x}, {y}) / pixel {}, expected ({ex}, {ey}) / pixel {}",
                    raster.transform().pixel_width,
                    reference.transform().pixel_width
                )));
            }
            match (raster.crs(), reference.crs()) {
                (Some(a), Some(b)) if !a.is_equivalent(b) => {
                    return Err(mismatch(format!("CRS {a}, expected {b}")));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Backend that supplies filtered scenes.
pub trait SceneSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Scenes matching `query`, ordered by date
    fn scenes(&self, query: &SceneQuery<'_>) -> Result<Vec<Scene>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::years::parse_date;
    use lulcview_core::{GeoTransform, CRS};

    fn aoi() -> AreaOfInterest {
        AreaOfInterest::new("sq", &[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]).unwrap()
    }

    #[test]
    fn cloud_filter_is_strict() {
        let aoi = aoi();
        let query = SceneQuery {
            collection: Collection::Sentinel2,
            range: DateRange::parse("2020-01-01", "2021-01-01").unwrap(),
            aoi: &aoi,
            max_cloud_percentage: Some(35.0),
            bands: vec!["B4"],
        };
        let date = parse_date("2020-06-01").unwrap();
        let fp = BBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(query.accepts(date, &fp, Some(34.99)));
        assert!(!query.accepts(date, &fp, Some(35.0)));
        assert!(!query.accepts(date, &fp, None));
        assert!(!query.accepts(parse_date("2021-01-01").unwrap(), &fp, Some(1.0)));
        assert!(!query.accepts(date, &BBox::new(5.0, 5.0, 6.0, 6.0), Some(1.0)));
    }

    #[test]
    fn common_grid_check() {
        let d = parse_date("2020-06-01").unwrap();
        let a = Scene::new("a", d, None).with_band("B4", Raster::new(2, 2));
        let b = Scene::new("b", d, None).with_band("B4", Raster::new(3, 2));
        assert!(ensure_common_grid(&[a.clone()], &["B4"]).is_ok());
        assert!(matches!(
            ensure_common_grid(&[a.clone(), b], &["B4"]),
            Err(CatalogError::GridMismatch { .. })
        ));
        assert!(matches!(
            ensure_common_grid(&[a], &["B8"]),
            Err(CatalogError::MissingBand { .. })
        ));
    }

    #[test]
    fn common_grid_compares_transform_and_crs() {
        let d = parse_date("2020-06-01").unwrap();
        let on = |x0: f64, epsg: u32| {
            let mut r = Raster::new(4, 4);
            r.set_transform(GeoTransform::new(x0, -15.0, 0.25, -0.25));
            r.set_crs(Some(CRS::from_epsg(epsg)));
            r
        };
        let a = Scene::new("a", d, None).with_band("label", on(12.0, 4326));
        let shifted = Scene::new("b", d, None).with_band("label", on(13.0, 4326));
        let other_crs = Scene::new("c", d, None).with_band("label", on(12.0, 32733));
        let same = Scene::new("d", d, None).with_band("label", on(12.0, 4326));

        assert!(ensure_common_grid(&[a.clone(), same], &["label"]).is_ok());
        assert!(matches!(
            ensure_common_grid(&[a.clone(), shifted], &["label"]),
            Err(CatalogError::GridMismatch { ref scene, .. }) if scene == "b"
        ));
        assert!(matches!(
            ensure_common_grid(&[a, other_crs], &["label"]),
            Err(CatalogError::GridMismatch { ref scene, .. }) if scene == "c"
        ));
    }
}
