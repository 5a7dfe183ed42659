//! Geo-Draw Kommandozeile.
//!
//! Lädt eine GeoJSON-Datei in den Editier-Kern, kombiniert bzw. zerlegt
//! optional alle Features und gibt die resultierende FeatureCollection aus.

use anyhow::Context;
use clap::Parser;
use geo_draw_core::app::{Collaborators, LoggingEventSink};
use geo_draw_core::{Draw, DrawOptions};
use std::path::PathBuf;

/// Nachbearbeitung nach dem Laden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Merge,
    Split,
}

#[derive(Parser, Debug)]
#[clap(name = "geo-draw", author, version, about, long_about = None)]
/// Geo-Draw - lädt GeoJSON in den Editier-Kern und gibt das Ergebnis aus
struct CliArgs {
    /// Eingabedatei (FeatureCollection, Feature oder Geometrie)
    #[clap(value_name = "FILE")]
    input: PathBuf,

    /// Alle geladenen Features zu einem Multi-Feature kombinieren
    #[clap(long, conflicts_with = "split")]
    merge: bool,

    /// Alle geladenen Multi-Features in Einzel-Features zerlegen
    #[clap(long)]
    split: bool,

    /// Optionsdatei (Standard: geo_draw.toml neben der Binary)
    #[clap(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl CliArgs {
    fn action(&self) -> Action {
        match (self.merge, self.split) {
            (true, _) => Action::Merge,
            (_, true) => Action::Split,
            _ => Action::None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Geo-Draw v{} startet...", env!("CARGO_PKG_VERSION"));

    let args = CliArgs::parse();
    let action = args.action();
    let config_path = args.config.unwrap_or_else(DrawOptions::config_path);
    let options = DrawOptions::load_from_file(&config_path);

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Datei nicht lesbar: {}", args.input.display()))?;
    let geojson: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Kein gültiges JSON: {}", args.input.display()))?;

    let mut collaborators = Collaborators::headless(&options);
    collaborators.event_sink = Box::new(LoggingEventSink);
    let mut draw = Draw::with_collaborators(options, collaborators);

    let ids = draw.add(&geojson)?;
    log::info!("{} Features geladen", ids.len());

    match action {
        Action::None => {}
        Action::Merge => {
            draw.merge_selected_features(&ids);
        }
        Action::Split => {
            draw.split_selected_features(&ids);
        }
    }

    println!("{}", serde_json::to_string_pretty(&draw.get_all())?);
    Ok(())
}
