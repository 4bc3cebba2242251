//! Error types for catalog construction and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading configuration or building the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("cannot serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("invalid date range {start}..{end}: end must be after start")]
    InvalidDateRange { start: String, end: String },

    #[error("invalid year table: {0}")]
    InvalidYearTable(String),

    #[error("unknown layer kind '{0}' (expected one of: true-color, vegetation, moisture, land-cover, confidence-shaded)")]
    UnknownLayer(String),

    #[error("unknown year '{0}'")]
    UnknownYear(String),

    #[error("invalid STAC collection {path}: {source}")]
    Stac {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("scene {scene}: missing band '{band}'")]
    MissingBand { scene: String, band: String },

    #[error("scene {scene}: band '{band}' is not on the common grid ({detail})")]
    GridMismatch {
        scene: String,
        band: String,
        detail: String,
    },

    #[error("scene source error: {0}")]
    Source(String),

    #[error("raster error: {0}")]
    Core(#[from] lulcview_core::Error),
}

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
