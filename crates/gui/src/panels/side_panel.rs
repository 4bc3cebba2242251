//! Side panel: title, introduction, layer selectors, layer info and legends.

use egui::{Color32, RichText, Sense, Ui, Vec2};

use lulcview_catalog::panel::{BULLETS, INTRO, LINK_LABEL, TITLE};
use lulcview_catalog::{CompareSession, LayerInfo, LayerKind, PaneId, UiEvent};
use lulcview_colormap::{Legend, Rgb};

fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

/// Show the side panel. Returns the layer change the user made, if any.
pub fn show_side_panel(ui: &mut Ui, session: Option<&CompareSession>) -> Option<UiEvent> {
    let mut event = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.label(RichText::new(TITLE).strong().size(26.0));
            ui.add_space(4.0);
            ui.label(INTRO);
            for point in BULLETS {
                ui.label(format!("• {}", point));
            }
            ui.add_space(10.0);

            for (pane, prompt) in [
                (PaneId::Left, "Select layer for left-side"),
                (PaneId::Right, "Select layer for right-side"),
            ] {
                ui.label(RichText::new(prompt).size(11.0));
                let Some(session) = session else {
                    ui.add_enabled(false, egui::Button::new("Building catalog..."));
                    continue;
                };
                let current = session.pane(pane).selection().kind;
                egui::ComboBox::from_id_salt(("layer_select", pane))
                    .selected_text(current.display_name())
                    .width(220.0)
                    .show_ui(ui, |ui| {
                        for kind in LayerKind::ALL {
                            if ui
                                .selectable_label(kind == current, kind.display_name())
                                .clicked()
                                && kind != current
                            {
                                event = Some(UiEvent::LayerChanged { pane, kind });
                            }
                        }
                    });
            }

            if let Some(session) = session {
                for info in session.panel().info_slots() {
                    ui.add_space(8.0);
                    show_info(ui, info);
                }
                ui.add_space(8.0);
                for legend in session.panel().legends() {
                    ui.separator();
                    show_legend(ui, legend);
                }
            }
        });

    event
}

fn show_info(ui: &mut Ui, info: &LayerInfo) {
    ui.group(|ui| {
        ui.strong(info.title);
        ui.label(RichText::new(info.description).size(13.0));
        ui.hyperlink_to(LINK_LABEL, info.link);
    });
}

fn show_legend(ui: &mut Ui, legend: &Legend) {
    match legend {
        Legend::Categorical { title, entries } => {
            ui.label(RichText::new(format!("{} Legend", title)).strong().size(16.0));
            for entry in entries {
                ui.horizontal(|ui| {
                    let (rect, _) = ui.allocate_exact_size(Vec2::splat(18.0), Sense::hover());
                    ui.painter().rect_filled(rect, 0.0, color32(entry.color));
                    ui.label(&entry.label);
                });
            }
        }
        Legend::Gradient {
            title,
            colors,
            min,
            max,
        } => {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{}:", title)).strong().size(16.0));
                ui.label(format!("{}", min));
                let width = 160.0;
                let (rect, _) = ui.allocate_exact_size(Vec2::new(width, 14.0), Sense::hover());
                let step = width / colors.len().max(1) as f32;
                for (i, c) in colors.iter().enumerate() {
                    let swatch = egui::Rect::from_min_size(
                        rect.min + Vec2::new(i as f32 * step, 0.0),
                        Vec2::new(step, rect.height()),
                    );
                    ui.painter().rect_filled(swatch, 0.0, color32(*c));
                }
                ui.label(format!("{}", max));
            });
        }
    }
}
