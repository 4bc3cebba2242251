//! Console panel: catalog build log with colored levels.

use egui::{Color32, RichText, ScrollArea, Ui};

use crate::state::{LogEntry, LogLevel};

fn level_style(level: LogLevel) -> (&'static str, Color32) {
    match level {
        LogLevel::Info => ("[INFO]", Color32::from_rgb(150, 180, 220)),
        LogLevel::Warning => ("[WARN]", Color32::from_rgb(230, 180, 50)),
        LogLevel::Error => ("[ERROR]", Color32::from_rgb(220, 60, 60)),
        LogLevel::Success => ("[OK]", Color32::from_rgb(60, 200, 80)),
    }
}

/// Show the console. Returns `true` when the user asked to clear it.
pub fn show_console(ui: &mut Ui, logs: &[LogEntry]) -> bool {
    let mut clear = false;
    ui.horizontal(|ui| {
        ui.strong("Console");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            clear = ui.small_button("Clear").clicked();
            let warnings = logs.iter().filter(|e| e.level == LogLevel::Warning).count();
            ui.label(format!("{} messages, {} warnings", logs.len(), warnings));
        });
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for entry in logs {
                let (prefix, color) = level_style(entry.level);
                let secs = entry
                    .timestamp
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs()
                    % 86400;

                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!(
                            "{:02}:{:02}:{:02}",
                            secs / 3600,
                            (secs % 3600) / 60,
                            secs % 60
                        ))
                        .color(Color32::GRAY)
                        .monospace()
                        .size(11.0),
                    );
                    ui.label(RichText::new(prefix).color(color).monospace().size(11.0));
                    ui.label(RichText::new(&entry.message).monospace().size(11.0));
                });
            }
        });
    clear
}
