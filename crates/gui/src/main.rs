//! lulcview Desktop GUI
//!
//! Two-pane swipe viewer for the multi-year land-cover catalog.

mod app;
mod loader;
mod panels;
mod state;

use std::path::PathBuf;

use clap::Parser;

use app::LulcViewApp;
use loader::SourceChoice;
use lulcview_catalog::AppConfig;

#[derive(Parser)]
#[command(name = "lulcview-gui")]
#[command(author, version, about = "Multi-year land-cover swipe viewer", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with sentinel2.json / dynamicworld.json STAC collections;
    /// generated scenes are used when omitted
    #[arg(long)]
    scenes: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = match &args.config {
        Some(path) => match AppConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(2);
            }
        },
        None => AppConfig::default(),
    };
    let source = args
        .scenes
        .map_or(SourceChoice::Synthetic, SourceChoice::Stac);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("LU/LC Analysis Tool")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "lulcview",
        native_options,
        Box::new(|cc| Ok(Box::new(LulcViewApp::new(cc, config, source)))),
    )
}
