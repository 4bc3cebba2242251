//! The five layer kinds a pane can show.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    /// Sentinel-2 median composite, bands B12/B8/B4
    TrueColor,
    /// NDVI median composite
    Vegetation,
    /// NDMI median composite
    Moisture,
    /// Dynamic World label mode
    LandCover,
    /// Dynamic World classes shaded by top-1 confidence
    ConfidenceShaded,
}

const DYNAMIC_WORLD_PAPER: &str = "https://www.nature.com/articles/s41597-022-01307-4";

impl LayerKind {
    /// All kinds in dropdown order.
    pub const ALL: [LayerKind; 5] = [
        Self::TrueColor,
        Self::Vegetation,
        Self::Moisture,
        Self::LandCover,
        Self::ConfidenceShaded,
    ];

    /// Name shown in the layer dropdowns
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TrueColor => "Sentinel 2",
            Self::Vegetation => "NDVI",
            Self::Moisture => "NDMI",
            Self::LandCover => "LU/LC Dynamic World",
            Self::ConfidenceShaded => "LU/LC Hilshade Probability",
        }
    }

    /// Identifier used in file names, CLI arguments and config
    pub fn slug(&self) -> &'static str {
        match self {
            Self::TrueColor => "true-color",
            Self::Vegetation => "vegetation",
            Self::Moisture => "moisture",
            Self::LandCover => "land-cover",
            Self::ConfidenceShaded => "confidence-shaded",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::TrueColor => {
                "Sentinel-2 offers high-resolution, multi-spectral imaging for environmental \
                 monitoring, focusing on vegetation, soil, water, and coastal areas. This app \
                 utilizes its harmonized collection, ensuring data consistency for all scenes \
                 post January 25, 2022."
            }
            Self::Vegetation => {
                "NDVI (Normalized Difference Vegetation Index) is a common calculation in remote \
                 sensing for assessing vegetation health and density."
            }
            Self::Moisture => {
                "The NDMI (Normalized Difference Moisture Index) uses NIR and SWIR bands to \
                 monitor changes in leaf water content by analyzing moisture levels. The value \
                 range of the NDMI is -1 to 1. Negative values of NDMI (red) correspond to \
                 barren soil. Values around zero (light green) generally correspond to water \
                 stress. High, positive values represent high canopy without water stress \
                 (blue).caused by leaf internal structure and dry matter, offering a precise \
                 measurement of plant hydration."
            }
            Self::LandCover => {
                "Dynamic World provides a 10m real-time Land Use/Land Cover dataset with class \
                 probabilities for nine categories, using Sentinel-2 L1C data from June 27, \
                 2015, to present. It emphasizes cloud-free observations with rigorous cloud \
                 and shadow masking."
            }
            Self::ConfidenceShaded => {
                "The Hilshade Probability layer visualizes Dynamic World LU/LC probabilities \
                 using a hillshade effect, based on the highest per-pixel probability. It \
                 interprets class confidence as elevation, creating a unique landscape view of \
                 class distribution."
            }
        }
    }

    /// External "Read more" reference
    pub fn link(&self) -> &'static str {
        match self {
            Self::TrueColor => {
                "https://sentinel.esa.int/web/sentinel/user-guides/sentinel-2-msi/resolutions/radiometric"
            }
            Self::Vegetation => {
                "https://www.sciencedirect.com/topics/earth-and-planetary-sciences/normalized-difference-vegetation-index"
            }
            Self::Moisture => "https://custom-scripts.sentinel-hub.com/sentinel-2/ndmi/",
            Self::LandCover | Self::ConfidenceShaded => DYNAMIC_WORLD_PAPER,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for LayerKind {
    type Err = CatalogError;

    /// Accepts the slug or the display name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| {
                k.slug().eq_ignore_ascii_case(needle) || k.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| CatalogError::UnknownLayer(s.to_string()))
    }
}
