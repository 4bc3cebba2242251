//! Layer recipes: (date range, area) → rendered image.
//!
//! Every recipe queries the scene source, reduces the series per pixel,
//! clips to the area of interest and renders to RGBA. A range without
//! qualifying scenes yields `Ok(None)`.

use crate::config::FilterConfig;
use crate::error::Result;
use crate::layer::LayerKind;
use crate::scenes::{
    ensure_common_grid, Collection, Scene, SceneQuery, SceneSource, DW_LABEL_BAND,
    DW_PROBABILITY_BANDS,
};
use crate::years::DateRange;
use lulcview_algorithms::composite::{pixel_max, reduce_bands, temporal_median, temporal_mode, Reducer};
use lulcview_algorithms::imagery::{
    apply_qa_mask, band_math, band_math_binary, scale_reflectance, BandMathOp, SpectralIndex,
};
use lulcview_algorithms::spatial::{clip_to_aoi, set_default_projection};
use lulcview_algorithms::terrain::{hillshade, HillshadeParams};
use lulcview_colormap::{palette_to_bands, visualize_palette, visualize_rgb, ColorScheme, RgbStretch};
use lulcview_core::{AreaOfInterest, Raster, RgbaImage, CRS};

/// Stretch for the B12/B8/B4 composite
pub const TRUE_COLOR_STRETCH: RgbStretch = RgbStretch {
    min: 0.0,
    max: 0.35,
    gamma: 0.83,
};

/// Stretch for the shaded classification
pub const CONFIDENCE_STRETCH: RgbStretch = RgbStretch {
    min: 0.0,
    max: 0.8,
    gamma: 1.0,
};

pub const TRUE_COLOR_BANDS: [&str; 3] = ["B12", "B8", "B4"];

/// Default projection and scale the confidence surface is shaded in
pub const CONFIDENCE_SCALE_M: f64 = 10.0;

/// A rendered composite and the number of scenes reduced into it.
#[derive(Debug, Clone)]
pub struct RecipeOutput {
    pub image: RgbaImage,
    pub scene_count: usize,
}

impl RecipeOutput {
    fn new(image: RgbaImage, scenes: &[Scene]) -> Self {
        Self {
            image,
            scene_count: scenes.len(),
        }
    }
}

/// Inputs shared by every recipe.
pub struct RecipeContext<'a> {
    pub source: &'a dyn SceneSource,
    pub aoi: &'a AreaOfInterest,
    pub filters: &'a FilterConfig,
}

impl RecipeContext<'_> {
    fn optical(&self, range: DateRange, bands: &[&'static str]) -> Result<Vec<Scene>> {
        let mut wanted: Vec<&str> = bands.to_vec();
        wanted.push("QA60");
        let query = SceneQuery {
            collection: Collection::Sentinel2,
            range,
            aoi: self.aoi,
            max_cloud_percentage: Some(self.filters.max_cloud_percentage),
            bands: wanted.clone(),
        };
        let scenes = self.source.scenes(&query)?;
        ensure_common_grid(&scenes, &wanted)?;
        Ok(scenes)
    }

    fn dynamic_world(&self, range: DateRange, bands: &[&'static str]) -> Result<Vec<Scene>> {
        let query = SceneQuery {
            collection: Collection::DynamicWorld,
            range,
            aoi: self.aoi,
            max_cloud_percentage: None,
            bands: bands.to_vec(),
        };
        let scenes = self.source.scenes(&query)?;
        ensure_common_grid(&scenes, bands)?;
        Ok(scenes)
    }

    /// Cloud-masked reflectance of `band` for one scene
    fn reflectance(&self, scene: &Scene, band: &str) -> Result<Raster<f64>> {
        let masked = apply_qa_mask(scene.band(band)?, scene.band("QA60")?)?;
        Ok(scale_reflectance(&masked, self.filters.reflectance_scale)?)
    }

    /// Dispatch to the recipe for `kind`
    pub fn render(&self, kind: LayerKind, range: DateRange) -> Result<Option<RecipeOutput>> {
        match kind {
            LayerKind::TrueColor => true_color(self, range),
            LayerKind::Vegetation => spectral_index(self, range, SpectralIndex::NDVI),
            LayerKind::Moisture => spectral_index(self, range, SpectralIndex::NDMI),
            LayerKind::LandCover => land_cover(self, range),
            LayerKind::ConfidenceShaded => confidence_shaded(self, range),
        }
    }
}

/// Median cloud-free reflectance of B12/B8/B4, stretched to RGB
pub fn true_color(ctx: &RecipeContext<'_>, range: DateRange) -> Result<Option<RecipeOutput>> {
    let scenes = ctx.optical(range, &TRUE_COLOR_BANDS)?;
    if scenes.is_empty() {
        return Ok(None);
    }

    let mut composite = Vec::with_capacity(3);
    for band in TRUE_COLOR_BANDS {
        let stack = scenes
            .iter()
            .map(|s| ctx.reflectance(s, band))
            .collect::<Result<Vec<_>>>()?;
        composite.push(clip_to_aoi(&temporal_median(&stack)?, ctx.aoi)?);
    }

    let image = visualize_rgb([&composite[0], &composite[1], &composite[2]], &TRUE_COLOR_STRETCH)?;
    Ok(Some(RecipeOutput::new(image, &scenes)))
}

/// Median of a per-scene normalized-difference index, through its palette
pub fn spectral_index(
    ctx: &RecipeContext<'_>,
    range: DateRange,
    index: SpectralIndex,
) -> Result<Option<RecipeOutput>> {
    let (a, b) = index.bands();
    let scenes = ctx.optical(range, &[a, b])?;
    if scenes.is_empty() {
        return Ok(None);
    }

    let stack = scenes
        .iter()
        .map(|s| Ok(index.compute(&ctx.reflectance(s, a)?, &ctx.reflectance(s, b)?)?))
        .collect::<Result<Vec<_>>>()?;
    let composite = clip_to_aoi(&temporal_median(&stack)?, ctx.aoi)?;

    let palette = match index {
        SpectralIndex::NDVI => ColorScheme::Ndvi.palette()?,
        SpectralIndex::NDMI => ColorScheme::Ndmi.palette()?,
    };
    let image = visualize_palette(&composite, &palette)?;
    Ok(Some(RecipeOutput::new(image, &scenes)))
}

fn label_mode(scenes: &[Scene]) -> Result<Raster<f64>> {
    let labels = scenes
        .iter()
        .map(|s| s.band(DW_LABEL_BAND).cloned())
        .collect::<Result<Vec<_>>>()?;
    Ok(temporal_mode(&labels)?)
}

/// Most frequent Dynamic World label, through the categorical palette
pub fn land_cover(ctx: &RecipeContext<'_>, range: DateRange) -> Result<Option<RecipeOutput>> {
    let scenes = ctx.dynamic_world(range, &[DW_LABEL_BAND])?;
    if scenes.is_empty() {
        return Ok(None);
    }

    let mode = clip_to_aoi(&label_mode(&scenes)?, ctx.aoi)?;
    let image = visualize_palette(&mode, &ColorScheme::LandCover.palette()?)?;
    Ok(Some(RecipeOutput::new(image, &scenes)))
}

/// Top-1 class confidence surface: `int(max_b mean_t(p_b) × 100)`
pub fn confidence_surface(scenes: &[Scene]) -> Result<Raster<f64>> {
    let series = scenes
        .iter()
        .map(|s| {
            DW_PROBABILITY_BANDS
                .iter()
                .map(|b| s.band(b).cloned())
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    let means = reduce_bands(&series, Reducer::Mean)?;
    let top1 = pixel_max(&means)?;
    Ok(band_math(&top1, |p| (p * 100.0).trunc())?)
}

/// Mode classification shaded by the hillshade of its confidence surface
pub fn confidence_shaded(ctx: &RecipeContext<'_>, range: DateRange) -> Result<Option<RecipeOutput>> {
    let mut bands = vec![DW_LABEL_BAND];
    bands.extend(DW_PROBABILITY_BANDS);
    let scenes = ctx.dynamic_world(range, &bands)?;
    if scenes.is_empty() {
        return Ok(None);
    }

    let confidence = set_default_projection(
        &confidence_surface(&scenes)?,
        CRS::web_mercator(),
        CONFIDENCE_SCALE_M,
    )?;
    let shade = band_math(&hillshade(&confidence, HillshadeParams::default())?, |v| v / 255.0)?;

    let mode = label_mode(&scenes)?;
    let mut shaded = Vec::with_capacity(3);
    for channel in palette_to_bands(&mode, &ColorScheme::LandCover.palette()?) {
        let unit = band_math(&channel, |v| v / 255.0)?;
        let lit = band_math_binary(&unit, &shade, BandMathOp::Multiply)?;
        shaded.push(clip_to_aoi(&lit, ctx.aoi)?);
    }

    let image = visualize_rgb([&shaded[0], &shaded[1], &shaded[2]], &CONFIDENCE_STRETCH)?;
    Ok(Some(RecipeOutput::new(image, &scenes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::{SyntheticConfig, SyntheticSource};
    use crate::years::parse_date;
    use chrono::NaiveDate;

    fn aoi() -> AreaOfInterest {
        AreaOfInterest::new("sq", &[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]).unwrap()
    }

    fn range() -> DateRange {
        DateRange::parse("2020-01-01", "2020-12-30").unwrap()
    }

    fn probability_scene(id: &str, date: NaiveDate, label: usize, top1: f64) -> Scene {
        let mut scene = Scene::new(id, date, None)
            .with_band(DW_LABEL_BAND, Raster::filled(3, 3, label as f64));
        for (i, b) in DW_PROBABILITY_BANDS.iter().enumerate() {
            let p = if i == label { top1 } else { (1.0 - top1) / 8.0 };
            scene = scene.with_band(*b, Raster::filled(3, 3, p));
        }
        scene
    }

    #[test]
    fn confidence_is_truncated_percent_of_mean_top1() {
        let d = parse_date("2020-03-01").unwrap();
        let scenes = vec![
            probability_scene("a", d, 1, 0.81),
            probability_scene("b", d, 1, 0.60),
        ];
        let c = confidence_surface(&scenes).unwrap();
        // mean(0.81, 0.60) = 0.705 → 70
        assert_eq!(c.get(1, 1).unwrap(), 70.0);
    }

    #[test]
    fn every_kind_renders_from_synthetic_scenes() {
        let aoi = aoi();
        let source = SyntheticSource::new(
            SyntheticConfig::for_area(&aoi)
                .with_grid(16, 12)
                .with_scenes_per_year(12),
        );
        let filters = FilterConfig::default();
        let ctx = RecipeContext {
            source: &source,
            aoi: &aoi,
            filters: &filters,
        };

        for kind in LayerKind::ALL {
            let out = ctx.render(kind, range()).unwrap().expect("scenes available");
            assert_eq!(out.image.shape(), (16, 12));
            assert!(out.scene_count > 0);
            assert!(out.image.opaque_count() > 0, "{} rendered nothing", kind);
        }
    }

    #[test]
    fn empty_range_renders_nothing() {
        let aoi = aoi();
        let source =
            SyntheticSource::new(SyntheticConfig::for_area(&aoi).with_grid(8, 8).with_year(2020, 0));
        let filters = FilterConfig::default();
        let ctx = RecipeContext {
            source: &source,
            aoi: &aoi,
            filters: &filters,
        };
        for kind in LayerKind::ALL {
            assert!(ctx.render(kind, range()).unwrap().is_none());
        }
    }
}
