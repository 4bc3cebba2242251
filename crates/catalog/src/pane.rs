//! One map pane: its (kind, year) selection, viewport and single layer slot.

use crate::catalog::{ProductCatalog, RenderedLayer};
use crate::layer::LayerKind;
use crate::years::YearLabel;
use lulcview_core::AreaOfInterest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneId {
    Left,
    Right,
}

impl PaneId {
    pub const BOTH: [PaneId; 2] = [Self::Left, Self::Right];

    pub fn other(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneSelection {
    pub kind: LayerKind,
    pub year: YearLabel,
}

/// Map centre in area coordinates plus zoom level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center_x: f64, center_y: f64, zoom: f64) -> Self {
        Self {
            center_x,
            center_y,
            zoom,
        }
    }

    /// Centred on the area's centroid
    pub fn centered_on(aoi: &AreaOfInterest, zoom: f64) -> Self {
        let (x, y) = aoi.centroid();
        Self::new(x, y, zoom)
    }
}

#[derive(Debug, Clone)]
pub struct PaneController {
    id: PaneId,
    selection: PaneSelection,
    viewport: Viewport,
    slot: Option<Arc<RenderedLayer>>,
}

impl PaneController {
    pub fn new(id: PaneId, selection: PaneSelection, viewport: Viewport) -> Self {
        Self {
            id,
            selection,
            viewport,
            slot: None,
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn selection(&self) -> &PaneSelection {
        &self.selection
    }

    pub fn set_layer(&mut self, kind: LayerKind) {
        self.selection.kind = kind;
    }

    pub fn set_year(&mut self, year: YearLabel) {
        self.selection.year = year;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Replace the slot with the entry for the current selection, or clear
    /// it when the catalog has none. Returns whether a layer is shown.
    pub fn render(&mut self, catalog: &ProductCatalog) -> bool {
        self.slot = catalog.get(self.selection.kind, &self.selection.year);
        self.slot.is_some()
    }

    /// The visible layer, if any
    pub fn layer(&self) -> Option<&Arc<RenderedLayer>> {
        self.slot.as_ref()
    }

    /// Number of layers in the pane; never more than one
    pub fn layer_count(&self) -> usize {
        usize::from(self.slot.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::scenes::{SyntheticConfig, SyntheticSource};
    use crate::years::{DateRange, YearTable};

    fn catalog() -> ProductCatalog {
        let aoi =
            AreaOfInterest::new("sq", &[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]).unwrap();
        let years = YearTable::new(vec![
            (YearLabel::new("x"), DateRange::parse("2018-01-01", "2018-12-30").unwrap()),
            (YearLabel::new("y"), DateRange::parse("2021-01-01", "2021-12-30").unwrap()),
        ])
        .unwrap();
        let source = SyntheticSource::new(
            SyntheticConfig::for_area(&aoi)
                .with_grid(6, 6)
                .with_scenes_per_year(12)
                .with_year(2021, 0),
        );
        ProductCatalog::build(&aoi, &years, &FilterConfig::default(), &source).unwrap()
    }

    #[test]
    fn render_replaces_or_clears_the_slot() {
        let catalog = catalog();
        let mut pane = PaneController::new(
            PaneId::Left,
            PaneSelection {
                kind: LayerKind::Vegetation,
                year: "x".into(),
            },
            Viewport::new(0.5, 0.5, 10.0),
        );
        assert_eq!(pane.layer_count(), 0);

        assert!(pane.render(&catalog));
        assert_eq!(pane.layer().unwrap().kind, LayerKind::Vegetation);

        pane.set_layer(LayerKind::LandCover);
        assert!(pane.render(&catalog));
        assert_eq!(pane.layer_count(), 1);
        assert_eq!(pane.layer().unwrap().kind, LayerKind::LandCover);

        // No scenes for "y": the pane goes empty instead of keeping "x"
        pane.set_year("y".into());
        assert!(!pane.render(&catalog));
        assert_eq!(pane.layer_count(), 0);
    }

    #[test]
    fn other_pane() {
        assert_eq!(PaneId::Left.other(), PaneId::Right);
        assert_eq!(PaneId::Right.to_string(), "right");
    }
}
