//! lulcview CLI - multi-year land-cover comparison

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use lulcview_catalog::{
    AppConfig, CompareSession, LayerKind, PaneId, ProductCatalog, SceneSource,
    StacDirectorySource, SyntheticConfig, SyntheticSource, UiEvent, YearLabel,
};
use lulcview_colormap::{side_panel_legends, Legend};
use lulcview_core::io::write_rgba_geotiff;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lulcview")]
#[command(author, version, about = "Multi-year land-cover swipe comparison", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file (defaults reproduce the Namibe app)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory with sentinel2.json / dynamicworld.json STAC collections
    #[arg(long, global = true, conflicts_with = "synthetic")]
    scenes: Option<PathBuf>,

    /// Use generated scenes instead of a scene directory
    #[arg(long, global = true)]
    synthetic: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List year labels and the date ranges they select
    Years,
    /// Print the land cover, NDVI and NDMI legends
    Legend {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Describe a layer kind
    Info {
        /// Layer kind: true-color, vegetation, moisture, land-cover, confidence-shaded
        kind: String,
    },
    /// Print the effective configuration as TOML
    Config,
    /// Build the catalog and export every entry as an RGBA GeoTIFF
    Build {
        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Drive a two-pane session and export the swiped composite
    Compare {
        /// Left pane as KIND:YEAR, e.g. true-color:2016
        #[arg(long)]
        left: Option<String>,
        /// Right pane as KIND:YEAR
        #[arg(long)]
        right: Option<String>,
        /// Divider position in [0, 1]
        #[arg(long, default_value = "0.5")]
        swipe: f64,
        /// Output GeoTIFF
        #[arg(short, long)]
        out: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn scene_source(cli: &Cli, config: &AppConfig) -> Result<Box<dyn SceneSource>> {
    match &cli.scenes {
        Some(dir) => {
            if !dir.is_dir() {
                bail!("Scene directory not found: {}", dir.display());
            }
            Ok(Box::new(StacDirectorySource::new(dir)))
        }
        None => {
            if !cli.synthetic {
                warn!("no --scenes directory given, using synthetic scenes");
            }
            let aoi = config.area().context("Invalid area of interest")?;
            Ok(Box::new(SyntheticSource::new(SyntheticConfig::for_area(&aoi))))
        }
    }
}

fn build_catalog(config: &AppConfig, source: &dyn SceneSource) -> Result<ProductCatalog> {
    let aoi = config.area().context("Invalid area of interest")?;
    let years = config.year_table().context("Invalid year table")?;
    let total = LayerKind::ALL.len() * years.len();

    let pb = spinner("Building catalog...");
    let mut done = 0;
    let catalog = ProductCatalog::build_with_progress(&aoi, &years, &config.filters, source, |kind, year| {
        done += 1;
        pb.set_message(format!("Building catalog... {}/{} ({} {})", done, total, kind.slug(), year));
    })
    .context("Failed to build catalog")?;
    pb.finish_and_clear();
    Ok(catalog)
}

/// `KIND:YEAR`, both parts validated against the config
fn parse_selection(spec: &str, config: &AppConfig) -> Result<(LayerKind, YearLabel)> {
    let Some((kind, year)) = spec.split_once(':') else {
        bail!("Expected KIND:YEAR, got '{}'", spec);
    };
    let kind: LayerKind = kind.parse()?;
    let years = config.year_table()?;
    let (label, _) = years.resolve(year)?;
    Ok((kind, label.clone()))
}

fn print_legend(legend: &Legend) {
    println!("{}", legend.title());
    match legend {
        Legend::Categorical { entries, .. } => {
            for e in entries {
                println!("  {} {:>2} {}", e.color, e.value, e.label);
            }
        }
        Legend::Gradient {
            colors, min, max, ..
        } => {
            let ramp: Vec<String> = colors.iter().map(|c| c.to_string()).collect();
            println!("  [{}, {}] {}", min, max, ramp.join(" "));
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Years => {
            let years = config.year_table()?;
            for (label, range) in years.iter() {
                println!("{}  {}", label, range);
            }
        }

        Commands::Legend { json } => {
            let legends = side_panel_legends()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&legends)?);
            } else {
                for legend in &legends {
                    print_legend(legend);
                }
            }
        }

        Commands::Info { kind } => {
            let kind: LayerKind = kind.parse()?;
            println!("{} ({})", kind.display_name(), kind.slug());
            println!("\n{}", kind.description());
            println!("\nRead more: {}", kind.link());
        }

        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }

        Commands::Build { out } => {
            let source = scene_source(&cli, &config)?;
            let start = Instant::now();
            let catalog = build_catalog(&config, source.as_ref())?;
            let elapsed = start.elapsed();

            std::fs::create_dir_all(out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            let pb = spinner("Writing layers...");
            for entry in catalog.entries() {
                let path = out.join(format!("{}_{}.tif", entry.kind.slug(), entry.year));
                write_rgba_geotiff(&entry.image, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            pb.finish_and_clear();

            println!("{} layers saved to: {}", catalog.len(), out.display());
            println!("  Processing time: {:.2?}", elapsed);
            let missing = catalog.missing();
            if !missing.is_empty() {
                println!("  No scenes for:");
                for (kind, year) in missing {
                    println!("    {} {}", kind.slug(), year);
                }
            }
        }

        Commands::Compare {
            left,
            right,
            swipe,
            out,
        } => {
            let mut events = Vec::new();
            for (pane, spec) in [(PaneId::Left, left), (PaneId::Right, right)] {
                if let Some(spec) = spec {
                    let (kind, year) = parse_selection(spec, &config)?;
                    events.push(UiEvent::LayerChanged { pane, kind });
                    events.push(UiEvent::YearChanged { pane, year });
                }
            }
            events.push(UiEvent::SwipeMoved { position: *swipe });

            let source = scene_source(&cli, &config)?;
            let catalog = Arc::new(build_catalog(&config, source.as_ref())?);
            let mut session = CompareSession::new(&config, catalog)?;
            for event in events {
                session.handle(event)?;
            }

            for id in PaneId::BOTH {
                let pane = session.pane(id);
                let sel = pane.selection();
                match pane.layer() {
                    Some(layer) => info!(
                        "{} pane: {} {} ({} scenes)",
                        id,
                        sel.kind.display_name(),
                        sel.year,
                        layer.scene_count
                    ),
                    None => warn!("{} pane: no layer for {} {}", id, sel.kind.display_name(), sel.year),
                }
            }

            let Some(image) = session.swipe_composite()? else {
                bail!("Neither pane has a layer to export");
            };
            write_rgba_geotiff(&image, out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Swipe composite saved to: {}", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parsing() {
        let config = AppConfig::default();
        let (kind, year) = parse_selection("moisture:2019", &config).unwrap();
        assert_eq!(kind, LayerKind::Moisture);
        assert_eq!(year.as_str(), "2019");

        assert!(parse_selection("moisture", &config).is_err());
        assert!(parse_selection("dem:2019", &config).is_err());
        assert!(parse_selection("moisture:1999", &config).is_err());
    }

    #[test]
    fn cli_parses_compare() {
        let cli = Cli::try_parse_from([
            "lulcview",
            "--synthetic",
            "compare",
            "--left",
            "ndvi:2016",
            "--out",
            "x.tif",
        ])
        .unwrap();
        assert!(cli.synthetic);
        assert!(matches!(cli.command, Commands::Compare { .. }));
    }

    #[test]
    fn scenes_and_synthetic_conflict() {
        assert!(Cli::try_parse_from(["lulcview", "--scenes", "d", "--synthetic", "years"]).is_err());
    }
}
