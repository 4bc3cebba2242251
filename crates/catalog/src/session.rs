//! Compare session: both panes, the side panel and the swipe divider.
//!
//! All interaction goes through [`CompareSession::handle`], one event at a
//! time. The catalog is shared and never mutated here.

use crate::catalog::ProductCatalog;
use crate::config::{AppConfig, InfoPolicy, PaneDefault};
use crate::error::{CatalogError, Result};
use crate::layer::LayerKind;
use crate::pane::{PaneController, PaneId, PaneSelection, Viewport};
use crate::panel::SidePanel;
use crate::years::YearLabel;
use lulcview_core::{Error as CoreError, RgbaImage};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    LayerChanged { pane: PaneId, kind: LayerKind },
    YearChanged { pane: PaneId, year: YearLabel },
    ViewChanged { pane: PaneId, viewport: Viewport },
    /// Divider position, 0 = all right pane, 1 = all left pane
    SwipeMoved { position: f64 },
}

#[derive(Debug, Clone)]
pub struct CompareSession {
    catalog: Arc<ProductCatalog>,
    left: PaneController,
    right: PaneController,
    panel: SidePanel,
    linked: bool,
    swipe: f64,
}

impl CompareSession {
    /// Initial state from `config`: each pane on its configured layer and
    /// year (first year when unset), centred on the area, swipe at 0.5,
    /// side panel describing the right pane.
    pub fn new(config: &AppConfig, catalog: Arc<ProductCatalog>) -> Result<Self> {
        let viewport = Viewport::centered_on(&config.area()?, config.view.zoom);
        let selection = |pane: &PaneDefault| -> Result<PaneSelection> {
            let year = match &pane.year {
                Some(y) => catalog.years().resolve(y.as_str())?.0.clone(),
                None => catalog.years().first().clone(),
            };
            Ok(PaneSelection {
                kind: pane.layer,
                year,
            })
        };
        let left = PaneController::new(PaneId::Left, selection(&config.view.left)?, viewport);
        let right = PaneController::new(PaneId::Right, selection(&config.view.right)?, viewport);

        let mut panel = SidePanel::new(config.view.info_policy)?;
        panel.show_info(PaneId::Right, right.selection().kind);
        if config.view.info_policy == InfoPolicy::PerPane {
            panel.show_info(PaneId::Left, left.selection().kind);
        }

        let mut session = Self {
            catalog,
            left,
            right,
            panel,
            linked: config.view.linked,
            swipe: 0.5,
        };
        for id in PaneId::BOTH {
            session.render(id);
        }
        Ok(session)
    }

    pub fn catalog(&self) -> &Arc<ProductCatalog> {
        &self.catalog
    }

    pub fn pane(&self, id: PaneId) -> &PaneController {
        match id {
            PaneId::Left => &self.left,
            PaneId::Right => &self.right,
        }
    }

    fn pane_mut(&mut self, id: PaneId) -> &mut PaneController {
        match id {
            PaneId::Left => &mut self.left,
            PaneId::Right => &mut self.right,
        }
    }

    pub fn panel(&self) -> &SidePanel {
        &self.panel
    }

    pub fn swipe(&self) -> f64 {
        self.swipe
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }

    fn render(&mut self, id: PaneId) {
        let catalog = Arc::clone(&self.catalog);
        let pane = self.pane_mut(id);
        if !pane.render(&catalog) {
            let sel = pane.selection();
            debug!("{} pane: no layer for {} {}", id, sel.kind.slug(), sel.year);
        }
    }

    /// Apply one UI event.
    ///
    /// Unknown years and non-finite swipe positions are rejected without
    /// changing any state.
    pub fn handle(&mut self, event: UiEvent) -> Result<()> {
        debug!("event: {:?}", event);
        match event {
            UiEvent::LayerChanged { pane, kind } => {
                self.pane_mut(pane).set_layer(kind);
                self.render(pane);
                self.panel.show_info(pane, kind);
            }
            UiEvent::YearChanged { pane, year } => {
                if self.catalog.years().get(&year).is_none() {
                    return Err(CatalogError::UnknownYear(year.to_string()));
                }
                self.pane_mut(pane).set_year(year);
                self.render(pane);
            }
            UiEvent::ViewChanged { pane, viewport } => {
                if self.linked {
                    self.left.set_viewport(viewport);
                    self.right.set_viewport(viewport);
                } else {
                    self.pane_mut(pane).set_viewport(viewport);
                }
            }
            UiEvent::SwipeMoved { position } => {
                if !position.is_finite() {
                    return Err(CoreError::InvalidParameter {
                        name: "swipe",
                        value: position.to_string(),
                        reason: "must be finite".into(),
                    }
                    .into());
                }
                self.swipe = position.clamp(0.0, 1.0);
            }
        }
        Ok(())
    }

    /// What the swipe view shows: left pane pixels in columns left of the
    /// divider, right pane pixels from the divider on. An empty pane
    /// contributes transparent pixels. `None` when both panes are empty.
    pub fn swipe_composite(&self) -> Result<Option<RgbaImage>> {
        let left = self.left.layer().map(|l| &l.image);
        let right = self.right.layer().map(|l| &l.image);
        let Some(base) = left.or(right) else {
            return Ok(None);
        };
        let (rows, cols) = base.shape();
        if let (Some(l), Some(r)) = (left, right) {
            if l.shape() != r.shape() {
                return Err(CoreError::SizeMismatch {
                    er: l.rows(),
                    ec: l.cols(),
                    ar: r.rows(),
                    ac: r.cols(),
                }
                .into());
            }
        }

        let split = (self.swipe * cols as f64).round() as usize;
        let mut out = RgbaImage::transparent(rows, cols)
            .with_georef(*base.transform(), base.crs().cloned());
        for row in 0..rows {
            for col in 0..cols {
                let src = if col < split { left } else { right };
                if let Some(img) = src {
                    out.set_pixel(row, col, img.pixel(row, col)?)?;
                }
            }
        }
        Ok(Some(out))
    }
}
