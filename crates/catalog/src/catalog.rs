//! The product catalog: every (layer kind, year) rendered once at startup.

use crate::config::{AppConfig, FilterConfig};
use crate::error::Result;
use crate::layer::LayerKind;
use crate::recipes::RecipeContext;
use crate::scenes::SceneSource;
use crate::years::{DateRange, YearLabel, YearTable};
use lulcview_core::{AreaOfInterest, RgbaImage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// One catalog entry.
#[derive(Debug, Clone)]
pub struct RenderedLayer {
    pub kind: LayerKind,
    pub year: YearLabel,
    pub range: DateRange,
    pub image: RgbaImage,
    pub scene_count: usize,
}

/// Immutable mapping `(kind, year) → layer`. Keys whose date range had no
/// qualifying scenes are absent.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    years: YearTable,
    entries: HashMap<(LayerKind, YearLabel), Arc<RenderedLayer>>,
}

impl ProductCatalog {
    /// Render every (kind, year) pair from `source`.
    ///
    /// `progress` is called once per pair, after it has been attempted.
    pub fn build_with_progress<F>(
        aoi: &AreaOfInterest,
        years: &YearTable,
        filters: &FilterConfig,
        source: &dyn SceneSource,
        mut progress: F,
    ) -> Result<Self>
    where
        F: FnMut(LayerKind, &YearLabel),
    {
        let ctx = RecipeContext {
            source,
            aoi,
            filters,
        };
        let start = Instant::now();
        let mut entries = HashMap::new();

        for kind in LayerKind::ALL {
            for (year, range) in years.iter() {
                match ctx.render(kind, *range)? {
                    Some(out) => {
                        info!(
                            "built {} {} ({}) from {} scenes",
                            kind.slug(),
                            year,
                            range,
                            out.scene_count
                        );
                        entries.insert(
                            (kind, year.clone()),
                            Arc::new(RenderedLayer {
                                kind,
                                year: year.clone(),
                                range: *range,
                                image: out.image,
                                scene_count: out.scene_count,
                            }),
                        );
                    }
                    None => warn!("no scenes for {} {} ({})", kind.slug(), year, range),
                }
                progress(kind, year);
            }
        }

        info!(
            "catalog from {}: {}/{} entries in {:.2?}",
            source.name(),
            entries.len(),
            LayerKind::ALL.len() * years.len(),
            start.elapsed()
        );
        Ok(Self {
            years: years.clone(),
            entries,
        })
    }

    pub fn build(
        aoi: &AreaOfInterest,
        years: &YearTable,
        filters: &FilterConfig,
        source: &dyn SceneSource,
    ) -> Result<Self> {
        Self::build_with_progress(aoi, years, filters, source, |_, _| {})
    }

    /// Build with the area, years and filters of `config`
    pub fn from_config(config: &AppConfig, source: &dyn SceneSource) -> Result<Self> {
        Self::build(
            &config.area()?,
            &config.year_table()?,
            &config.filters,
            source,
        )
    }

    pub fn get(&self, kind: LayerKind, year: &YearLabel) -> Option<Arc<RenderedLayer>> {
        self.entries.get(&(kind, year.clone())).cloned()
    }

    pub fn contains(&self, kind: LayerKind, year: &YearLabel) -> bool {
        self.entries.contains_key(&(kind, year.clone()))
    }

    pub fn years(&self) -> &YearTable {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in kind-then-year order
    pub fn entries(&self) -> Vec<Arc<RenderedLayer>> {
        LayerKind::ALL
            .iter()
            .flat_map(|&kind| self.years.labels().filter_map(move |y| self.get(kind, y)))
            .collect()
    }

    /// Pairs with no entry, in kind-then-year order
    pub fn missing(&self) -> Vec<(LayerKind, YearLabel)> {
        LayerKind::ALL
            .iter()
            .flat_map(|&kind| {
                self.years
                    .labels()
                    .filter(move |y| !self.contains(kind, y))
                    .map(move |y| (kind, y.clone()))
            })
            .collect()
    }
}
