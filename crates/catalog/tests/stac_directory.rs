//! Recipes over a STAC directory of GeoTIFF band assets.

use lulcview_catalog::config::FilterConfig;
use lulcview_catalog::recipes::{RecipeContext, TRUE_COLOR_STRETCH};
use lulcview_catalog::{CatalogError, DateRange, LayerKind, StacDirectorySource};
use lulcview_colormap::ColorScheme;
use lulcview_core::io::write_geotiff;
use lulcview_core::{AreaOfInterest, GeoTransform, Raster};
use serde_json::json;
use std::path::Path;

fn band(value: f64) -> Raster<f64> {
    band_at(value, 12.0)
}

fn band_at(value: f64, origin_x: f64) -> Raster<f64> {
    let mut r = Raster::filled(4, 4, value);
    r.set_transform(GeoTransform::new(origin_x, -15.0, 0.25, -0.25));
    r
}

fn aoi() -> AreaOfInterest {
    AreaOfInterest::new(
        "tile",
        &[[11.9, -16.1], [11.9, -14.9], [13.1, -14.9], [13.1, -16.1]],
    )
    .unwrap()
}

/// Write one band per asset and return the item JSON
fn item(
    dir: &Path,
    id: &str,
    datetime: &str,
    cloud: f64,
    bands: &[(&str, Raster<f64>)],
) -> serde_json::Value {
    let mut assets = serde_json::Map::new();
    for (name, raster) in bands {
        let href = format!("{}_{}.tif", id, name);
        write_geotiff(raster, dir.join(&href)).unwrap();
        assets.insert(name.to_string(), json!({ "href": href }));
    }
    json!({
        "type": "Feature",
        "id": id,
        "bbox": [12.0, -16.0, 13.0, -15.0],
        "properties": {
            "datetime": datetime,
            "CLOUDY_PIXEL_PERCENTAGE": cloud,
            "proj:epsg": 4326
        },
        "assets": assets
    })
}

fn write_collection(dir: &Path, file: &str, items: Vec<serde_json::Value>) {
    let collection = json!({ "type": "FeatureCollection", "features": items });
    std::fs::write(dir.join(file), collection.to_string()).unwrap();
}

fn s2_bands(b12: f64, b8: f64, b4: f64, qa: Raster<f64>) -> Vec<(&'static str, Raster<f64>)> {
    vec![
        ("B12", band(b12)),
        ("B8", band(b8)),
        ("B4", band(b4)),
        ("B11", band(b8 / 2.0)),
        ("QA60", qa),
    ]
}

#[test]
fn true_color_masks_clouds_and_filters_scenes() {
    let dir = tempfile::tempdir().unwrap();
    let mut qa = band(0.0);
    qa.set(0, 0, 1024.0).unwrap();

    write_collection(
        dir.path(),
        "sentinel2.json",
        vec![
            item(dir.path(), "clear", "2020-03-01T10:00:00Z", 10.0, &s2_bands(1000.0, 2000.0, 500.0, band(0.0))),
            item(dir.path(), "patchy", "2020-04-01T10:00:00Z", 20.0, &s2_bands(3000.0, 4000.0, 1500.0, qa)),
            // Above the cloud threshold
            item(dir.path(), "cloudy", "2020-05-01T10:00:00Z", 50.0, &s2_bands(9000.0, 9000.0, 9000.0, band(0.0))),
            // Outside the date range
            item(dir.path(), "late", "2021-01-01T10:00:00Z", 0.0, &s2_bands(9000.0, 9000.0, 9000.0, band(0.0))),
        ],
    );

    let source = StacDirectorySource::new(dir.path());
    let aoi = aoi();
    let filters = FilterConfig::default();
    let ctx = RecipeContext {
        source: &source,
        aoi: &aoi,
        filters: &filters,
    };
    let range = DateRange::parse("2020-01-01", "2021-01-01").unwrap();
    let out = ctx.render(LayerKind::TrueColor, range).unwrap().unwrap();
    assert_eq!(out.scene_count, 2);

    // Masked pixel: only the clear scene
    let s = TRUE_COLOR_STRETCH;
    assert_eq!(
        out.image.pixel(0, 0).unwrap(),
        [s.apply(0.1), s.apply(0.2), s.apply(0.05), 255]
    );
    // Elsewhere: median of two is their mean
    assert_eq!(
        out.image.pixel(2, 2).unwrap(),
        [
            s.apply((0.1 + 0.3) / 2.0),
            s.apply((0.2 + 0.4) / 2.0),
            s.apply((0.05 + 0.15) / 2.0),
            255
        ]
    );
}

#[test]
fn land_cover_from_label_assets() {
    let dir = tempfile::tempdir().unwrap();
    let mut odd = band(1.0);
    odd.set(3, 3, 6.0).unwrap();
    write_collection(
        dir.path(),
        "dynamicworld.json",
        vec![
            item(dir.path(), "dw1", "2020-02-01", 0.0, &[("label", band(1.0))]),
            item(dir.path(), "dw2", "2020-03-01", 0.0, &[("label", odd)]),
            item(dir.path(), "dw3", "2020-04-01", 0.0, &[("label", band(6.0))]),
        ],
    );

    let source = StacDirectorySource::new(dir.path());
    let aoi = aoi();
    let filters = FilterConfig::default();
    let ctx = RecipeContext {
        source: &source,
        aoi: &aoi,
        filters: &filters,
    };
    let range = DateRange::parse("2020-01-01", "2020-12-30").unwrap();
    let out = ctx.render(LayerKind::LandCover, range).unwrap().unwrap();

    let palette = ColorScheme::LandCover.palette().unwrap();
    let trees = palette.class_color(1).unwrap().to_rgba();
    let built = palette.class_color(6).unwrap().to_rgba();
    assert_eq!(out.image.pixel(0, 0).unwrap(), trees);
    assert_eq!(out.image.pixel(3, 3).unwrap(), built);

    // No Sentinel-2 collection in the directory: no true-colour layer
    assert!(ctx.render(LayerKind::TrueColor, range).unwrap().is_none());
}

#[test]
fn missing_band_asset_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write_collection(
        dir.path(),
        "dynamicworld.json",
        vec![item(dir.path(), "dw1", "2020-02-01", 0.0, &[("water", band(0.5))])],
    );
    let source = StacDirectorySource::new(dir.path());
    let aoi = aoi();
    let filters = FilterConfig::default();
    let ctx = RecipeContext {
        source: &source,
        aoi: &aoi,
        filters: &filters,
    };
    let range = DateRange::parse("2020-01-01", "2020-12-30").unwrap();
    let err = ctx.render(LayerKind::LandCover, range).unwrap_err();
    assert!(matches!(err, CatalogError::MissingBand { .. }));
}

#[test]
fn scenes_on_shifted_grids_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_collection(
        dir.path(),
        "dynamicworld.json",
        vec![
            item(dir.path(), "dw1", "2020-02-01", 0.0, &[("label", band_at(1.0, 12.0))]),
            item(dir.path(), "dw2", "2020-03-01", 0.0, &[("label", band_at(6.0, 13.0))]),
            item(dir.path(), "dw3", "2020-04-01", 0.0, &[("label", band_at(6.0, 13.0))]),
        ],
    );
    let source = StacDirectorySource::new(dir.path());
    let aoi = aoi();
    let filters = FilterConfig::default();
    let ctx = RecipeContext {
        source: &source,
        aoi: &aoi,
        filters: &filters,
    };
    let range = DateRange::parse("2020-01-01", "2020-12-30").unwrap();
    let err = ctx.render(LayerKind::LandCover, range).unwrap_err();
    assert!(matches!(err, CatalogError::GridMismatch { ref scene, .. } if scene == "dw2"));
}
