//! Side panel content: static text, legends and the layer info slot(s).

use crate::config::InfoPolicy;
use crate::layer::LayerKind;
use crate::pane::PaneId;
use crate::error::Result;
use lulcview_colormap::{side_panel_legends, Legend};
use serde::Serialize;

pub const TITLE: &str = "LU/LC Analysis Tool";

pub const INTRO: &str = "Select layers and years to compare land use and land cover changes. \
    Use the dropdown menus to configure the map display. The application offers:";

pub const BULLETS: [&str; 3] = [
    "High-resolution satellite imagery analysis",
    "Near-real-time LULC data visualization",
    "Comparative analysis across different years",
];

pub const YEAR_PROMPT: &str = "Choose a year";
pub const LINK_LABEL: &str = "Read more";

/// Description and reference link for one layer kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerInfo {
    pub kind: LayerKind,
    pub title: &'static str,
    pub description: &'static str,
    pub link: &'static str,
}

impl From<LayerKind> for LayerInfo {
    fn from(kind: LayerKind) -> Self {
        Self {
            kind,
            title: kind.display_name(),
            description: kind.description(),
            link: kind.link(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SidePanel {
    policy: InfoPolicy,
    legends: Vec<Legend>,
    shared: Option<LayerInfo>,
    left: Option<LayerInfo>,
    right: Option<LayerInfo>,
}

impl SidePanel {
    pub fn new(policy: InfoPolicy) -> Result<Self> {
        Ok(Self {
            policy,
            legends: side_panel_legends()?,
            shared: None,
            left: None,
            right: None,
        })
    }

    pub fn policy(&self) -> InfoPolicy {
        self.policy
    }

    /// Land cover, NDVI and NDMI legends, built from the render palettes
    pub fn legends(&self) -> &[Legend] {
        &self.legends
    }

    /// Swap in the description for `kind` after `pane`'s selector changed
    pub fn show_info(&mut self, pane: PaneId, kind: LayerKind) {
        let info = Some(LayerInfo::from(kind));
        match (self.policy, pane) {
            (InfoPolicy::Shared, _) => self.shared = info,
            (InfoPolicy::PerPane, PaneId::Left) => self.left = info,
            (InfoPolicy::PerPane, PaneId::Right) => self.right = info,
        }
    }

    /// Info to display for `pane`. Under the shared policy both panes see
    /// the same slot.
    pub fn info(&self, pane: PaneId) -> Option<&LayerInfo> {
        match (self.policy, pane) {
            (InfoPolicy::Shared, _) => self.shared.as_ref(),
            (InfoPolicy::PerPane, PaneId::Left) => self.left.as_ref(),
            (InfoPolicy::PerPane, PaneId::Right) => self.right.as_ref(),
        }
    }

    /// Every visible info slot, in display order
    pub fn info_slots(&self) -> Vec<&LayerInfo> {
        match self.policy {
            InfoPolicy::Shared => self.shared.iter().collect(),
            InfoPolicy::PerPane => self.left.iter().chain(self.right.iter()).collect(),
        }
    }
}
