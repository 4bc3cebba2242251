//! Legends generated from the same [`PaletteSpec`] values used for rendering.

use crate::scheme::{ColorScheme, PaletteSpec, Rgb, LAND_COVER_CLASSES};
use lulcview_core::Result;
use serde::Serialize;

/// One swatch of a categorical legend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub value: usize,
    pub label: String,
    pub color: Rgb,
}

/// A legend: either one swatch per class or a continuous ramp
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Legend {
    Categorical {
        title: String,
        entries: Vec<LegendEntry>,
    },
    Gradient {
        title: String,
        colors: Vec<Rgb>,
        min: f64,
        max: f64,
    },
}

impl Legend {
    /// One entry per palette colour, labelled by `labels` (falls back to the
    /// class index when a label is missing)
    pub fn categorical(title: impl Into<String>, palette: &PaletteSpec, labels: &[&str]) -> Self {
        let entries = palette
            .colors()
            .iter()
            .enumerate()
            .map(|(i, &color)| LegendEntry {
                value: i,
                label: labels.get(i).map_or_else(|| i.to_string(), |l| l.to_string()),
                color,
            })
            .collect();
        Legend::Categorical {
            title: title.into(),
            entries,
        }
    }

    /// Continuous ramp over the palette's domain
    pub fn gradient(title: impl Into<String>, palette: &PaletteSpec) -> Self {
        Legend::Gradient {
            title: title.into(),
            colors: palette.colors().to_vec(),
            min: palette.min(),
            max: palette.max(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Legend::Categorical { title, .. } | Legend::Gradient { title, .. } => title,
        }
    }

    /// Swatch colours in display order
    pub fn colors(&self) -> Vec<Rgb> {
        match self {
            Legend::Categorical { entries, .. } => entries.iter().map(|e| e.color).collect(),
            Legend::Gradient { colors, .. } => colors.clone(),
        }
    }
}

/// Land-cover classes 0..=8 with their Dynamic World names
pub fn land_cover_legend() -> Result<Legend> {
    Ok(Legend::categorical(
        "LU/LC",
        &ColorScheme::LandCover.palette()?,
        &LAND_COVER_CLASSES,
    ))
}

pub fn ndvi_legend() -> Result<Legend> {
    Ok(Legend::gradient("NDVI", &ColorScheme::Ndvi.palette()?))
}

pub fn ndmi_legend() -> Result<Legend> {
    Ok(Legend::gradient("NDMI", &ColorScheme::Ndmi.palette()?))
}

/// The three legends shown in the side panel, in display order
pub fn side_panel_legends() -> Result<Vec<Legend>> {
    Ok(vec![land_cover_legend()?, ndvi_legend()?, ndmi_legend()?])
}
