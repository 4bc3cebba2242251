//! Swipe canvas: both panes drawn over one area, split by a draggable divider.
//!
//! Pan and zoom are reported as viewport changes; the session decides
//! whether the other pane follows.

use std::collections::HashMap;

use egui::{Color32, Pos2, Rect, Sense, Stroke, TextureHandle, Vec2};

use lulcview_catalog::panel::YEAR_PROMPT;
use lulcview_catalog::{
    CompareSession, LayerKind, PaneId, RenderedLayer, UiEvent, Viewport, YearLabel,
};
use lulcview_core::GeoTransform;

const DIVIDER_GRAB: f32 = 6.0;
const ZOOM_STEP: f64 = 0.25;
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Textures of catalog entries, uploaded on first display.
#[derive(Default)]
pub struct SwipeCanvasState {
    textures: HashMap<(LayerKind, YearLabel), TextureHandle>,
    dragging_divider: bool,
    /// Pane the current pan gesture started in
    pan_pane: Option<PaneId>,
}

impl SwipeCanvasState {
    fn texture(&mut self, ctx: &egui::Context, layer: &RenderedLayer) -> TextureHandle {
        self.textures
            .entry((layer.kind, layer.year.clone()))
            .or_insert_with(|| {
                let (rows, cols) = layer.image.shape();
                let image = egui::ColorImage::from_rgba_unmultiplied([cols, rows], layer.image.pixels());
                ctx.load_texture(
                    format!("{}_{}", layer.kind.slug(), layer.year),
                    image,
                    egui::TextureOptions::NEAREST,
                )
            })
            .clone()
    }
}

/// Screen pixels per layer pixel at `zoom`
fn screen_scale(layer: &RenderedLayer, canvas: Rect, zoom: f64, base_zoom: f64) -> f32 {
    let (rows, cols) = layer.image.shape();
    let fit = (canvas.width() / cols.max(1) as f32).min(canvas.height() / rows.max(1) as f32);
    fit * 2f32.powf((zoom - base_zoom) as f32)
}

/// Year selectors above the canvas, one per pane.
fn show_year_bar(ui: &mut egui::Ui, session: &CompareSession, events: &mut Vec<UiEvent>) {
    let mut year_combo = |ui: &mut egui::Ui, pane: PaneId| {
        let current = &session.pane(pane).selection().year;
        ui.label(YEAR_PROMPT);
        egui::ComboBox::from_id_salt(("year_select", pane))
            .selected_text(current.as_str())
            .show_ui(ui, |ui| {
                for label in session.catalog().years().labels() {
                    if ui.selectable_label(label == current, label.as_str()).clicked()
                        && label != current
                    {
                        events.push(UiEvent::YearChanged {
                            pane,
                            year: label.clone(),
                        });
                    }
                }
            });
    };

    ui.horizontal(|ui| {
        year_combo(ui, PaneId::Left);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            year_combo(ui, PaneId::Right);
        });
    });
}

/// Render the swipe view. Returns the events produced by user interaction.
pub fn show_swipe_canvas(
    ui: &mut egui::Ui,
    session: &CompareSession,
    state: &mut SwipeCanvasState,
    base_zoom: f64,
) -> Vec<UiEvent> {
    let mut events = Vec::new();
    show_year_bar(ui, session, &mut events);

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::drag());
    let canvas = response.rect;
    painter.rect_filled(canvas, 0.0, Color32::from_gray(30));

    let divider_x = canvas.left() + session.swipe() as f32 * canvas.width();
    let clips = [
        (PaneId::Left, Rect::from_min_max(canvas.min, Pos2::new(divider_x, canvas.bottom()))),
        (PaneId::Right, Rect::from_min_max(Pos2::new(divider_x, canvas.top()), canvas.max)),
    ];

    for (id, clip) in clips {
        let pane = session.pane(id);
        let Some(layer) = pane.layer() else {
            painter.with_clip_rect(clip).text(
                clip.center(),
                egui::Align2::CENTER_CENTER,
                "No layer for this selection",
                egui::FontId::proportional(14.0),
                Color32::GRAY,
            );
            continue;
        };
        let tex = state.texture(ui.ctx(), layer);
        let vp = pane.viewport();
        let scale = screen_scale(layer, canvas, vp.zoom, base_zoom);
        let (ccol, crow) = layer.image.transform().geo_to_pixel(vp.center_x, vp.center_y);
        let (rows, cols) = layer.image.shape();
        let origin = canvas.center() - Vec2::new(ccol as f32 * scale, crow as f32 * scale);
        let img_rect = Rect::from_min_size(origin, Vec2::new(cols as f32, rows as f32) * scale);
        painter.with_clip_rect(clip).image(
            tex.id(),
            img_rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    // Pane captions
    for (id, align, pos) in [
        (PaneId::Left, egui::Align2::LEFT_TOP, canvas.left_top() + Vec2::splat(8.0)),
        (PaneId::Right, egui::Align2::RIGHT_TOP, canvas.right_top() + Vec2::new(-8.0, 8.0)),
    ] {
        let sel = session.pane(id).selection();
        painter.text(
            pos,
            align,
            format!("{} · {}", sel.kind.display_name(), sel.year),
            egui::FontId::proportional(13.0),
            Color32::WHITE,
        );
    }

    // Divider: drawn and interacted with on top of the map
    let handle = Rect::from_min_max(
        Pos2::new(divider_x - DIVIDER_GRAB, canvas.top()),
        Pos2::new(divider_x + DIVIDER_GRAB, canvas.bottom()),
    );
    let divider = ui.interact(handle, ui.id().with("swipe_divider"), Sense::drag());
    painter.line_segment(
        [Pos2::new(divider_x, canvas.top()), Pos2::new(divider_x, canvas.bottom())],
        Stroke::new(3.0, Color32::WHITE),
    );
    if divider.hovered() || divider.dragged() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
    }
    state.dragging_divider = divider.dragged();
    if state.dragging_divider {
        if let Some(pos) = divider.interact_pointer_pos() {
            let position = ((pos.x - canvas.left()) / canvas.width()) as f64;
            events.push(UiEvent::SwipeMoved {
                position: position.clamp(0.0, 1.0),
            });
        }
    }

    // Pan (drag) and zoom (wheel) on the pane under the pointer
    if response.drag_started() {
        state.pan_pane = response
            .interact_pointer_pos()
            .map(|p| if p.x < divider_x { PaneId::Left } else { PaneId::Right });
    }
    if !response.dragged() {
        state.pan_pane = None;
    }
    if let (Some(id), false) = (state.pan_pane, state.dragging_divider) {
        let delta = response.drag_delta();
        if delta != Vec2::ZERO {
            if let Some(vp) = panned(session, id, canvas, base_zoom, delta) {
                events.push(UiEvent::ViewChanged { pane: id, viewport: vp });
            }
        }
    }

    let scroll = ui.input(|i| i.raw_scroll_delta.y);
    if scroll != 0.0 && response.hovered() {
        if let Some(p) = response.hover_pos() {
            let id = if p.x < divider_x { PaneId::Left } else { PaneId::Right };
            let mut vp = session.pane(id).viewport();
            vp.zoom = (vp.zoom + ZOOM_STEP * scroll.signum() as f64).clamp(base_zoom - 4.0, base_zoom + 8.0);
            events.push(UiEvent::ViewChanged { pane: id, viewport: vp });
        }
    }

    if let Some(layer) = session.pane(PaneId::Left).layer().or(session.pane(PaneId::Right).layer()) {
        let vp = session.pane(PaneId::Left).viewport();
        draw_scale_bar(
            &painter,
            &canvas,
            layer.image.transform(),
            vp.center_y,
            screen_scale(layer, canvas, vp.zoom, base_zoom),
        );
    }

    events
}

/// Viewport of `id` after dragging by `delta` screen pixels
fn panned(
    session: &CompareSession,
    id: PaneId,
    canvas: Rect,
    base_zoom: f64,
    delta: Vec2,
) -> Option<Viewport> {
    let layer = session
        .pane(id)
        .layer()
        .or(session.pane(id.other()).layer())?;
    let mut vp = session.pane(id).viewport();
    let scale = screen_scale(layer, canvas, vp.zoom, base_zoom) as f64;
    let t = layer.image.transform();
    vp.center_x -= delta.x as f64 / scale * t.pixel_width;
    vp.center_y -= delta.y as f64 / scale * t.pixel_height;
    Some(vp)
}

/// Draw a scale bar in the bottom-left corner of the canvas.
fn draw_scale_bar(
    painter: &egui::Painter,
    canvas_rect: &Rect,
    transform: &GeoTransform,
    latitude: f64,
    pixel_scale: f32,
) {
    // Layers are in lon/lat; convert the cell size to metres at the centre
    let cell_m = transform.pixel_width.abs() * METERS_PER_DEGREE * latitude.to_radians().cos();
    if cell_m <= 0.0 || pixel_scale <= 0.0 {
        return;
    }

    let m_per_px = cell_m / pixel_scale as f64;
    let raw = m_per_px * 150.0;

    // Round to a nice number
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    let nice = if raw / magnitude < 2.0 {
        magnitude
    } else if raw / magnitude < 5.0 {
        2.0 * magnitude
    } else {
        5.0 * magnitude
    };

    let bar_px = (nice / m_per_px) as f32;
    if !(20.0..=400.0).contains(&bar_px) {
        return;
    }
    let label = if nice >= 1000.0 {
        format!("{:.0} km", nice / 1000.0)
    } else {
        format!("{:.0} m", nice)
    };

    let bar_y = canvas_rect.bottom() - 24.0;
    let bar_x = canvas_rect.left() + 16.0;

    let bg = Rect::from_min_size(
        Pos2::new(bar_x - 4.0, bar_y - 16.0),
        Vec2::new(bar_px + 8.0, 30.0),
    );
    painter.rect_filled(bg, 3.0, Color32::from_black_alpha(140));
    painter.rect_filled(
        Rect::from_min_size(Pos2::new(bar_x, bar_y), Vec2::new(bar_px, 6.0)),
        1.0,
        Color32::WHITE,
    );
    painter.text(
        Pos2::new(bar_x + bar_px / 2.0, bar_y - 4.0),
        egui::Align2::CENTER_BOTTOM,
        label,
        egui::FontId::proportional(11.0),
        Color32::WHITE,
    );
}
