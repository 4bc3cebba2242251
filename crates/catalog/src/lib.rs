//! # lulcview Catalog
//!
//! Everything between the scene archive and the screen:
//! - [`AppConfig`]: TOML configuration with the Namibe defaults
//! - [`YearTable`]: year labels and the date ranges they stand for
//! - [`SceneSource`]: STAC directory or synthetic imagery
//! - [`recipes`]: the five layer recipes
//! - [`ProductCatalog`]: every (layer kind, year) rendered at startup
//! - [`CompareSession`]: two panes, side panel and swipe divider
//!
//! ## Usage
//!
//! ```ignore
//! use lulcview_catalog::{AppConfig, CompareSession, ProductCatalog, SyntheticConfig, SyntheticSource};
//! use std::sync::Arc;
//!
//! let config = AppConfig::default();
//! let source = SyntheticSource::new(SyntheticConfig::for_area(&config.area()?));
//! let catalog = Arc::new(ProductCatalog::from_config(&config, &source)?);
//! let session = CompareSession::new(&config, catalog)?;
//! ```

mod catalog;
pub mod config;
pub mod error;
mod layer;
mod pane;
pub mod panel;
pub mod recipes;
pub mod scenes;
mod session;
pub mod years;

pub use catalog::{ProductCatalog, RenderedLayer};
pub use config::{AppConfig, InfoPolicy};
pub use error::{CatalogError, Result};
pub use layer::LayerKind;
pub use pane::{PaneController, PaneId, PaneSelection, Viewport};
pub use panel::{LayerInfo, SidePanel};
pub use scenes::{
    Collection, Scene, SceneQuery, SceneSource, StacDirectorySource, SyntheticConfig,
    SyntheticSource,
};
pub use session::{CompareSession, UiEvent};
pub use years::{DateRange, YearLabel, YearTable};
