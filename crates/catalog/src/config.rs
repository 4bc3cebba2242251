//! Application configuration.
//!
//! Every field has a default reproducing the Namibe comparison app, so an
//! empty or partial TOML file is valid.

use crate::error::{CatalogError, Result};
use crate::layer::LayerKind;
use crate::years::{DateRange, YearLabel, YearTable};
use lulcview_core::AreaOfInterest;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Namibe province bounding polygon, lon/lat
pub const NAMIBE_VERTICES: [[f64; 2]; 4] = [
    [13.83562071063496, -17.4275303929221],
    [13.83562071063496, -13.39319000170853],
    [11.57243711688496, -13.39319000170853],
    [11.57243711688496, -17.4275303929221],
];

/// Year labels and their date ranges. Labels and ranges run in opposite
/// directions; the pairing is kept exactly as published.
const DEFAULT_YEARS: [(&str, &str, &str); 8] = [
    ("2016", "2023-01-01", "2023-10-30"),
    ("2017", "2022-01-01", "2022-12-30"),
    ("2018", "2021-01-01", "2021-12-30"),
    ("2019", "2020-01-01", "2020-12-30"),
    ("2020", "2019-01-01", "2019-12-30"),
    ("2021", "2018-01-01", "2018-12-30"),
    ("2022", "2017-01-01", "2017-12-30"),
    ("2023", "2016-01-01", "2016-12-30"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub area: AreaConfig,
    pub filters: FilterConfig,
    pub view: ViewConfig,
    pub years: Vec<YearEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    pub name: String,
    pub vertices: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Scenes must have a cloudy-pixel percentage strictly below this
    pub max_cloud_percentage: f64,
    /// Digital numbers are divided by this to get reflectance
    pub reflectance_scale: f64,
}

/// Which side-panel slot a layer change writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InfoPolicy {
    /// One slot; the last changed selector wins
    #[default]
    Shared,
    /// One slot per pane
    PerPane,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub zoom: f64,
    /// Pan and zoom of one pane follow the other
    pub linked: bool,
    pub info_policy: InfoPolicy,
    pub left: PaneDefault,
    pub right: PaneDefault,
}

/// Initial selection of one pane; `year = None` picks the first table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneDefault {
    pub layer: LayerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<YearLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearEntry {
    pub label: String,
    pub start: String,
    pub end: String,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            name: "Namibe".into(),
            vertices: NAMIBE_VERTICES.to_vec(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_cloud_percentage: 35.0,
            reflectance_scale: 10_000.0,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            zoom: 10.0,
            linked: true,
            info_policy: InfoPolicy::Shared,
            left: PaneDefault {
                layer: LayerKind::TrueColor,
                year: None,
            },
            right: PaneDefault {
                layer: LayerKind::ConfidenceShaded,
                year: None,
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            area: AreaConfig::default(),
            filters: FilterConfig::default(),
            view: ViewConfig::default(),
            years: DEFAULT_YEARS
                .iter()
                .map(|&(label, start, end)| YearEntry {
                    label: label.into(),
                    start: start.into(),
                    end: end.into(),
                })
                .collect(),
        }
    }
}

impl AppConfig {
    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that the area, filters, years and pane defaults are consistent
    pub fn validate(&self) -> Result<()> {
        self.area()?;
        if !(self.filters.reflectance_scale > 0.0) {
            return Err(lulcview_core::Error::InvalidParameter {
                name: "reflectance_scale",
                value: self.filters.reflectance_scale.to_string(),
                reason: "must be positive".into(),
            }
            .into());
        }
        let years = self.year_table()?;
        for pane in [&self.view.left, &self.view.right] {
            if let Some(year) = &pane.year {
                years.resolve(year.as_str())?;
            }
        }
        Ok(())
    }

    pub fn area(&self) -> Result<AreaOfInterest> {
        Ok(AreaOfInterest::new(&self.area.name, &self.area.vertices)?)
    }

    pub fn year_table(&self) -> Result<YearTable> {
        let entries = self
            .years
            .iter()
            .map(|y| Ok((YearLabel::new(&y.label), DateRange::parse(&y.start, &y.end)?)))
            .collect::<Result<Vec<_>>>()?;
        YearTable::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = AppConfig::default();
        let text = config.to_toml_string().unwrap();
        let back = AppConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.year_table().unwrap().len(), 8);
    }

    #[test]
    fn default_2016_resolves_to_2023_range() {
        let table = AppConfig::default().year_table().unwrap();
        let (_, range) = table.resolve("2016").unwrap();
        assert_eq!(range.to_string(), "2023-01-01..2023-10-30");
        let (_, range) = table.resolve("2023").unwrap();
        assert_eq!(range.to_string(), "2016-01-01..2016-12-30");
    }

    #[test]
    fn partial_override() {
        let text = r#"
            [filters]
            max_cloud_percentage = 20.0

            [view]
            info_policy = "per-pane"
            left = { layer = "moisture", year = "2019" }
        "#;
        let config = AppConfig::from_toml_str(text).unwrap();
        assert_eq!(config.filters.max_cloud_percentage, 20.0);
        assert_eq!(config.filters.reflectance_scale, 10_000.0);
        assert_eq!(config.view.info_policy, InfoPolicy::PerPane);
        assert_eq!(config.view.left.layer, LayerKind::Moisture);
        assert_eq!(config.view.right.layer, LayerKind::ConfidenceShaded);
    }

    #[test]
    fn rejects_unknown_layer_and_year() {
        assert!(AppConfig::from_toml_str("[view]\nleft = { layer = \"dem\" }").is_err());
        let err = AppConfig::from_toml_str("[view]\nleft = { layer = \"moisture\", year = \"1990\" }")
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownYear(_)));
    }

    #[test]
    fn rejects_bad_dates() {
        let text = r#"
            [[years]]
            label = "x"
            start = "2020-05-01"
            end = "2020-01-01"
        "#;
        assert!(matches!(
            AppConfig::from_toml_str(text),
            Err(CatalogError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lulcview.toml");
        std::fs::write(&path, "[view]\nzoom = 8.0\nlinked = false\n").unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.view.zoom, 8.0);
        assert!(!config.view.linked);

        assert!(matches!(
            AppConfig::load(dir.path().join("missing.toml")),
            Err(CatalogError::Io { .. })
        ));
    }
}
