//! Main application: LulcViewApp implements eframe::App.

use crossbeam_channel::Receiver;
use tracing::{debug, warn};

use lulcview_catalog::{AppConfig, CompareSession, UiEvent};

use crate::loader::{spawn_catalog_build, SourceChoice};
use crate::panels::console::show_console;
use crate::panels::side_panel::show_side_panel;
use crate::panels::swipe_canvas::{show_swipe_canvas, SwipeCanvasState};
use crate::state::{AppMessage, LogEntry};

/// The main application state.
pub struct LulcViewApp {
    config: AppConfig,

    /// Messages from the catalog builder thread.
    rx: Receiver<AppMessage>,

    /// Present once the catalog is built.
    session: Option<CompareSession>,

    /// Catalog build progress (done, total).
    progress: Option<(usize, usize)>,

    /// Console log entries.
    logs: Vec<LogEntry>,

    canvas: SwipeCanvasState,

    show_console: bool,
}

impl LulcViewApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, source: SourceChoice) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.window_shadow = egui::epaint::Shadow::NONE;
        cc.egui_ctx.set_visuals(visuals);

        let (tx, rx) = crossbeam_channel::unbounded();
        spawn_catalog_build(config.clone(), source, tx);

        let mut app = Self {
            config,
            rx,
            session: None,
            progress: Some((0, 0)),
            logs: Vec::new(),
            canvas: SwipeCanvasState::default(),
            show_console: true,
        };
        app.logs.push(LogEntry::info("lulcview started"));
        app.logs.push(LogEntry::info(format!(
            "Area: {}, {} years, cloud filter < {}%",
            app.config.area.name,
            app.config.years.len(),
            app.config.filters.max_cloud_percentage
        )));
        app
    }

    /// Process pending messages from background threads.
    fn process_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                AppMessage::Progress { done, total } => {
                    self.progress = Some((done, total));
                }

                AppMessage::CatalogReady { catalog, elapsed } => {
                    self.progress = None;
                    self.logs.push(LogEntry::success(format!(
                        "Catalog ready: {} layers in {:.2?}",
                        catalog.len(),
                        elapsed
                    )));
                    match CompareSession::new(&self.config, catalog) {
                        Ok(session) => self.session = Some(session),
                        Err(e) => self
                            .logs
                            .push(LogEntry::error(format!("Session: {}", e))),
                    }
                }

                AppMessage::Error { context, message } => {
                    self.progress = None;
                    warn!("{}: {}", context, message);
                    self.logs
                        .push(LogEntry::error(format!("{}: {}", context, message)));
                }

                AppMessage::Log(entry) => {
                    self.logs.push(entry);
                }
            }
        }
    }

    fn apply(&mut self, events: Vec<UiEvent>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        for event in events {
            let layer_change = match &event {
                UiEvent::LayerChanged { pane, .. } | UiEvent::YearChanged { pane, .. } => Some(*pane),
                _ => None,
            };
            if let Err(e) = session.handle(event) {
                self.logs.push(LogEntry::error(e.to_string()));
                continue;
            }
            if let Some(pane) = layer_change {
                let p = session.pane(pane);
                let sel = p.selection();
                if p.layer().is_none() {
                    self.logs.push(LogEntry::warning(format!(
                        "{} pane: no {} layer for {}",
                        pane,
                        sel.kind.display_name(),
                        sel.year
                    )));
                } else {
                    debug!("{} pane: {} {}", pane, sel.kind.slug(), sel.year);
                }
            }
        }
    }
}

impl eframe::App for LulcViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        if self.progress.is_some() {
            ctx.request_repaint();
        }

        let mut events = Vec::new();

        egui::SidePanel::left("side_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                if let Some(event) = show_side_panel(ui, self.session.as_ref()) {
                    events.push(event);
                }
            });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some((done, total)) = self.progress {
                    ui.spinner();
                    ui.label(format!("Building catalog {}/{}", done, total));
                    ui.separator();
                }
                if let Some(session) = self.session.as_mut() {
                    let mut linked = session.is_linked();
                    if ui.checkbox(&mut linked, "Link panes").changed() {
                        session.set_linked(linked);
                    }
                    ui.separator();
                }
                ui.toggle_value(&mut self.show_console, "Console");
            });
        });

        if self.show_console {
            egui::TopBottomPanel::bottom("console")
                .resizable(true)
                .default_height(140.0)
                .show(ctx, |ui| {
                    if show_console(ui, &self.logs) {
                        self.logs.clear();
                    }
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| match &self.session {
            Some(session) => {
                events.extend(show_swipe_canvas(
                    ui,
                    session,
                    &mut self.canvas,
                    self.config.view.zoom,
                ));
            }
            None => {
                ui.centered_and_justified(|ui| {
                    if self.progress.is_some() {
                        ui.spinner();
                    } else {
                        ui.label("No catalog. See the console for errors.");
                    }
                });
            }
        });

        self.apply(events);
    }
}
