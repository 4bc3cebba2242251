//! Local STAC item collections with GeoTIFF band assets.
//!
//! The source directory holds one GeoJSON FeatureCollection per collection
//! (`sentinel2.json`, `dynamicworld.json`). Each item names its bands as
//! asset keys; relative hrefs resolve against the directory.

use super::{Collection, Scene, SceneQuery, SceneSource};
use crate::error::{CatalogError, Result};
use chrono::{DateTime, NaiveDate};
use lulcview_core::io::read_geotiff;
use lulcview_core::{BBox, Raster, CRS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// STAC models
// ---------------------------------------------------------------------------

/// A STAC Item Collection (GeoJSON FeatureCollection).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItemCollection {
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<StacItem>,
}

/// A single STAC Item (GeoJSON Feature).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItem {
    #[serde(rename = "type")]
    pub type_: String,

    pub id: String,

    /// Bounding box `[west, south, east, north]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    pub properties: StacItemProperties,

    pub assets: HashMap<String, StacAsset>,
}

impl StacItem {
    pub fn asset(&self, key: &str) -> Option<&StacAsset> {
        self.assets.get(key)
    }

    /// EPSG code from the `proj:epsg` property, if available.
    pub fn epsg(&self) -> Option<u32> {
        self.properties
            .extra
            .get("proj:epsg")
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
    }

    /// Acquisition date from `datetime` (RFC 3339 or plain `YYYY-MM-DD`)
    pub fn date(&self) -> Option<NaiveDate> {
        let dt = self.properties.datetime.as_deref()?;
        DateTime::parse_from_rfc3339(dt)
            .map(|d| d.date_naive())
            .ok()
            .or_else(|| NaiveDate::parse_from_str(dt.get(..10)?, "%Y-%m-%d").ok())
    }

    /// Cloudy-pixel percentage: the Sentinel-2 granule property when present,
    /// otherwise `eo:cloud_cover`
    pub fn cloud_percentage(&self) -> Option<f64> {
        ["CLOUDY_PIXEL_PERCENTAGE", "s2:cloudy_pixel_percentage"]
            .iter()
            .find_map(|k| self.properties.extra.get(*k).and_then(|v| v.as_f64()))
            .or(self.properties.eo_cloud_cover)
    }

    pub fn footprint(&self) -> Option<BBox> {
        self.bbox.as_deref().and_then(BBox::from_slice)
    }
}

/// STAC Item properties.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItemProperties {
    /// ISO 8601 datetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    /// Cloud cover percentage (EO extension).
    #[serde(rename = "eo:cloud_cover", skip_serializing_if = "Option::is_none")]
    pub eo_cloud_cover: Option<f64>,

    /// All other properties we don't model explicitly.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A single STAC Asset (file reference).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacAsset {
    pub href: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Scene source backed by a directory of STAC collections.
#[derive(Debug, Clone)]
pub struct StacDirectorySource {
    root: PathBuf,
}

impl StacDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        let file = match collection {
            Collection::Sentinel2 => "sentinel2.json",
            Collection::DynamicWorld => "dynamicworld.json",
        };
        self.root.join(file)
    }

    /// Parse a collection file; a missing file is an empty collection
    pub fn load_collection(&self, collection: Collection) -> Result<Vec<StacItem>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            warn!("{} not found, treating {} as empty", path.display(), collection.id());
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed: StacItemCollection =
            serde_json::from_str(&text).map_err(|source| CatalogError::Stac { path, source })?;
        Ok(parsed.features)
    }

    fn read_band(&self, item: &StacItem, band: &str) -> Result<Raster<f64>> {
        let asset = item.asset(band).ok_or_else(|| CatalogError::MissingBand {
            scene: item.id.clone(),
            band: band.to_string(),
        })?;
        let href = Path::new(&asset.href);
        let path = if href.is_absolute() {
            href.to_path_buf()
        } else {
            self.root.join(href)
        };
        let mut raster: Raster<f64> = read_geotiff(&path).map_err(|e| match e {
            lulcview_core::Error::Io(source) => CatalogError::Io { path: path.clone(), source },
            other => CatalogError::Core(other),
        })?;
        // proj:epsg wins over the file's GeoKeys; neither means lon/lat
        let crs = item
            .epsg()
            .map(CRS::from_epsg)
            .or_else(|| raster.crs().cloned())
            .unwrap_or_else(CRS::wgs84);
        raster.set_crs(Some(crs));
        Ok(raster)
    }
}

impl SceneSource for StacDirectorySource {
    fn name(&self) -> &str {
        "stac-directory"
    }

    fn scenes(&self, query: &SceneQuery<'_>) -> Result<Vec<Scene>> {
        let items = self.load_collection(query.collection)?;
        let total = items.len();

        let mut scenes = Vec::new();
        for item in items {
            let (Some(date), Some(footprint)) = (item.date(), item.footprint()) else {
                warn!("skipping item {} without datetime or bbox", item.id);
                continue;
            };
            if !query.accepts(date, &footprint, item.cloud_percentage()) {
                continue;
            }

            let mut scene = Scene::new(&item.id, date, item.cloud_percentage());
            for &band in &query.bands {
                scene = scene.with_band(band, self.read_band(&item, band)?);
            }
            scenes.push(scene);
        }
        scenes.sort_by_key(|s| s.date);

        debug!(
            "{}: {} of {} items in {}",
            query.collection.id(),
            scenes.len(),
            total,
            query.range
        );
        Ok(scenes)
    }
}
