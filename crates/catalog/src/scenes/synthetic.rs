//! Deterministic generated scenes for demos and tests.
//!
//! A smooth land-cover field is laid over the grid and drifts slowly from
//! year to year. Sentinel-2 bands follow a per-class spectral table with
//! per-scene noise and cloud patches flagged in QA60; Dynamic World bands
//! carry the class label and class probabilities.

use super::{
    Collection, Scene, SceneQuery, SceneSource, DW_LABEL_BAND, DW_PROBABILITY_BANDS,
};
use crate::error::Result;
use chrono::{Datelike, Duration, NaiveDate};
use lulcview_core::{AreaOfInterest, BBox, GeoTransform, Raster, CRS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use tracing::debug;

/// B4, B8, B11, B12 digital numbers per Dynamic World class
const SPECTRA: [[f64; 4]; 9] = [
    [250.0, 150.0, 80.0, 60.0],
    [350.0, 3200.0, 1500.0, 700.0],
    [600.0, 2600.0, 2100.0, 1300.0],
    [400.0, 1800.0, 900.0, 500.0],
    [500.0, 3500.0, 1900.0, 1000.0],
    [900.0, 2200.0, 2500.0, 1800.0],
    [1500.0, 1900.0, 2300.0, 2100.0],
    [2200.0, 2800.0, 3600.0, 3200.0],
    [8000.0, 8000.0, 1000.0, 900.0],
];

const CLOUD_DN: f64 = 6500.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    pub extent: BBox,
    pub rows: usize,
    pub cols: usize,
    /// Scenes generated per calendar year unless overridden
    pub scenes_per_year: usize,
    /// Per-calendar-year overrides; zero leaves that year empty
    pub year_overrides: BTreeMap<i32, usize>,
    pub seed: u64,
}

impl SyntheticConfig {
    pub fn for_area(aoi: &AreaOfInterest) -> Self {
        Self {
            extent: aoi.bbox(),
            rows: 160,
            cols: 90,
            scenes_per_year: 6,
            year_overrides: BTreeMap::new(),
            seed: 0x5EED,
        }
    }

    pub fn with_grid(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_scenes_per_year(mut self, n: usize) -> Self {
        self.scenes_per_year = n;
        self
    }

    pub fn with_year(mut self, year: i32, scenes: usize) -> Self {
        self.year_overrides.insert(year, scenes);
        self
    }

    fn scenes_in(&self, year: i32) -> usize {
        self.year_overrides
            .get(&year)
            .copied()
            .unwrap_or(self.scenes_per_year)
    }
}

/// Scene source that fabricates imagery on the fly.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    config: SyntheticConfig,
    transform: GeoTransform,
    phases: [f64; 3],
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        let transform = GeoTransform::fit_bounds(config.extent.as_tuple(), config.cols, config.rows);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let phases = [
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
        ];
        Self {
            config,
            transform,
            phases,
        }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Acquisition dates for one calendar year, spread evenly from mid-January
    fn dates_in(&self, year: i32) -> Vec<NaiveDate> {
        let n = self.config.scenes_in(year);
        let Some(jan15) = NaiveDate::from_ymd_opt(year, 1, 15) else {
            return Vec::new();
        };
        let step = if n > 0 { 330 / n as i64 } else { 0 };
        (0..n as i64)
            .map(|k| jan15 + Duration::days(k * step))
            .collect()
    }

    /// Land-cover class at normalised grid position (u, v) for a given year
    fn class_at(&self, u: f64, v: f64, year: i32) -> usize {
        let drift = (year - 2016) as f64 * 0.08;
        let [p0, p1, p2] = self.phases;
        let e = (TAU * 1.3 * u + p0 + drift).sin()
            + (TAU * 1.7 * v + p1).sin()
            + 0.5 * (TAU * 3.0 * (u + v) + p2 - drift).sin();
        match e {
            e if e < -1.6 => 0,
            e if e < -1.1 => 3,
            e if e < -0.5 => 7,
            e if e < 0.0 => 5,
            e if e < 0.5 => 2,
            e if e < 1.0 => 4,
            e if e < 1.7 => 1,
            e if e < 2.2 => 6,
            _ => 8,
        }
    }

    fn grid<F: FnMut(usize, usize) -> f64>(&self, mut f: F) -> Raster<f64> {
        let mut r = Raster::from_fn(self.config.rows, self.config.cols, |(row, col)| f(row, col));
        r.set_transform(self.transform);
        r.set_crs(Some(CRS::wgs84()));
        r
    }

    fn scene_rng(&self, collection: Collection, date: NaiveDate) -> ChaCha8Rng {
        let tag = match collection {
            Collection::Sentinel2 => 0x5332,
            Collection::DynamicWorld => 0x4457,
        };
        let day = date.num_days_from_ce() as u64;
        ChaCha8Rng::seed_from_u64(self.config.seed ^ (day << 16) ^ tag)
    }

    fn uv(&self, row: usize, col: usize) -> (f64, f64) {
        (
            (col as f64 + 0.5) / self.config.cols as f64,
            (row as f64 + 0.5) / self.config.rows as f64,
        )
    }

    fn classes(&self, year: i32) -> Vec<usize> {
        let mut classes = Vec::with_capacity(self.config.rows * self.config.cols);
        for row in 0..self.config.rows {
            for col in 0..self.config.cols {
                let (u, v) = self.uv(row, col);
                classes.push(self.class_at(u, v, year));
            }
        }
        classes
    }

    fn sentinel2_scene(&self, date: NaiveDate, bands: &[&str]) -> Scene {
        let mut rng = self.scene_rng(Collection::Sentinel2, date);
        let cloud_pct: f64 = rng.gen_range(0.0..60.0);
        let classes = self.classes(date.year());
        let cols = self.config.cols;

        // Cloud patches cover roughly cloud_pct of the grid
        let patches: Vec<(f64, f64, f64, bool)> = (0..4)
            .map(|_| {
                let radius = (cloud_pct / 100.0 / 4.0 / std::f64::consts::PI).sqrt();
                (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0), radius, rng.gen_bool(0.3))
            })
            .collect();
        let cloud_at = |row: usize, col: usize| -> Option<bool> {
            let (u, v) = self.uv(row, col);
            patches
                .iter()
                .find(|(cu, cv, r, _)| (u - cu).powi(2) + (v - cv).powi(2) < r * r)
                .map(|&(_, _, _, cirrus)| cirrus)
        };
        let gain: f64 = rng.gen_range(0.95..1.05);

        let mut scene = Scene::new(
            format!("SYN_S2_{}", date.format("%Y%m%d")),
            date,
            Some(cloud_pct),
        );
        for &band in bands {
            let raster = match band {
                "QA60" => self.grid(|row, col| match cloud_at(row, col) {
                    Some(true) => 2048.0,
                    Some(false) => 1024.0,
                    None => 0.0,
                }),
                "B4" | "B8" | "B11" | "B12" => {
                    let idx = ["B4", "B8", "B11", "B12"]
                        .iter()
                        .position(|b| *b == band)
                        .unwrap_or(0);
                    self.grid(|row, col| {
                        if cloud_at(row, col).is_some() {
                            CLOUD_DN
                        } else {
                            (SPECTRA[classes[row * cols + col]][idx] * gain).round()
                        }
                    })
                }
                _ => continue,
            };
            scene = scene.with_band(band, raster);
        }
        scene
    }

    fn dynamic_world_scene(&self, date: NaiveDate, bands: &[&str]) -> Scene {
        let mut rng = self.scene_rng(Collection::DynamicWorld, date);
        let classes = self.classes(date.year());
        let cols = self.config.cols;

        // Per-scene label noise and a confidence field that varies smoothly
        let flips: Vec<Option<usize>> = (0..classes.len())
            .map(|_| rng.gen_bool(0.03).then(|| rng.gen_range(0..9)))
            .collect();
        let phase: f64 = rng.gen_range(0.0..TAU);
        let label_at = |row: usize, col: usize| {
            let i = row * cols + col;
            flips[i].unwrap_or(classes[i])
        };
        let top1_at = |row: usize, col: usize| {
            let (u, v) = self.uv(row, col);
            0.65 + 0.25 * (TAU * 2.0 * u + phase).sin() * (TAU * 2.0 * v).cos()
        };

        let mut scene = Scene::new(format!("SYN_DW_{}", date.format("%Y%m%d")), date, None);
        for &band in bands {
            let raster = if band == DW_LABEL_BAND {
                self.grid(|row, col| label_at(row, col) as f64)
            } else if let Some(class) = DW_PROBABILITY_BANDS.iter().position(|b| *b == band) {
                self.grid(|row, col| {
                    let top1 = top1_at(row, col);
                    if label_at(row, col) == class {
                        top1
                    } else {
                        (1.0 - top1) / 8.0
                    }
                })
            } else {
                continue;
            };
            scene = scene.with_band(band, raster);
        }
        scene
    }
}

impl SceneSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn scenes(&self, query: &SceneQuery<'_>) -> Result<Vec<Scene>> {
        let footprint = self.config.extent;
        let mut scenes = Vec::new();

        for year in query.range.start().year()..=query.range.end().year() {
            for date in self.dates_in(year) {
                let scene = match query.collection {
                    Collection::Sentinel2 => self.sentinel2_scene(date, &query.bands),
                    Collection::DynamicWorld => self.dynamic_world_scene(date, &query.bands),
                };
                if query.accepts(date, &footprint, scene.cloud_percentage) {
                    scenes.push(scene);
                }
            }
        }

        debug!(
            "synthetic {}: {} scenes in {}",
            query.collection.id(),
            scenes.len(),
            query.range
        );
        Ok(scenes)
    }
}
