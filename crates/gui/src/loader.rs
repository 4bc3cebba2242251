//! Catalog construction in a background thread.
//!
//! The build runs once on a `std::thread` and reports progress and the
//! finished catalog through `crossbeam_channel`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;

use lulcview_catalog::{
    AppConfig, LayerKind, ProductCatalog, SceneSource, StacDirectorySource, SyntheticConfig,
    SyntheticSource,
};

use crate::state::{AppMessage, LogEntry};

/// Where scenes come from.
#[derive(Debug, Clone)]
pub enum SourceChoice {
    Stac(PathBuf),
    Synthetic,
}

/// Build the product catalog for `config` in a background thread.
pub fn spawn_catalog_build(config: AppConfig, choice: SourceChoice, tx: Sender<AppMessage>) {
    std::thread::spawn(move || {
        let source: Box<dyn SceneSource> = match &choice {
            SourceChoice::Stac(dir) => Box::new(StacDirectorySource::new(dir)),
            SourceChoice::Synthetic => match config.area() {
                Ok(aoi) => Box::new(SyntheticSource::new(SyntheticConfig::for_area(&aoi))),
                Err(e) => return send_error(&tx, "Area of interest", e),
            },
        };
        let _ = tx.send(AppMessage::Log(LogEntry::info(format!(
            "Building catalog from {} scenes...",
            source.name()
        ))));

        let (aoi, years) = match (config.area(), config.year_table()) {
            (Ok(aoi), Ok(years)) => (aoi, years),
            (Err(e), _) | (_, Err(e)) => return send_error(&tx, "Configuration", e),
        };
        let total = LayerKind::ALL.len() * years.len();

        let start = Instant::now();
        let mut done = 0;
        let result = ProductCatalog::build_with_progress(
            &aoi,
            &years,
            &config.filters,
            source.as_ref(),
            |_, _| {
                done += 1;
                let _ = tx.send(AppMessage::Progress { done, total });
            },
        );

        match result {
            Ok(catalog) => {
                for (kind, year) in catalog.missing() {
                    let _ = tx.send(AppMessage::Log(LogEntry::warning(format!(
                        "No scenes for {} {}",
                        kind.display_name(),
                        year
                    ))));
                }
                let _ = tx.send(AppMessage::CatalogReady {
                    catalog: Arc::new(catalog),
                    elapsed: start.elapsed(),
                });
            }
            Err(e) => send_error(&tx, "Catalog build", e),
        }
    });
}

fn send_error(tx: &Sender<AppMessage>, context: &str, e: impl std::fmt::Display) {
    let _ = tx.send(AppMessage::Error {
        context: context.to_string(),
        message: e.to_string(),
    });
}
