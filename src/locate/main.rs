//! One-shot administrative lookup.
//!
//! Loads the boundary hierarchy from a directory of `{adcode}_full.json`
//! files and prints the levels containing a coordinate as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use adlookup::config::Overrides;
use adlookup::HierarchyBuild;

#[derive(Parser, Debug)]
#[command(name = "locate")]
#[command(about = "Resolve a coordinate to its administrative regions")]
struct Args {
    /// Latitude of the point
    #[arg(allow_hyphen_values = true, required_unless_present = "stats")]
    lat: Option<f64>,

    /// Longitude of the point
    #[arg(allow_hyphen_values = true, required_unless_present = "stats")]
    lon: Option<f64>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of boundary files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Root administrative code
    #[arg(long)]
    root: Option<String>,

    /// Attributes forming the key (comma-separated)
    #[arg(long, value_delimiter = ',')]
    keys: Option<Vec<String>>,

    /// Key delimiter
    #[arg(long)]
    delimiter: Option<String>,

    /// Maximum number of levels to descend (0 = unlimited)
    #[arg(long)]
    max_levels: Option<usize>,

    /// Print hierarchy statistics instead of looking up a point
    #[arg(long)]
    stats: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct HierarchyStats {
    root: String,
    indexes: Vec<IndexStats>,
    missing: Vec<String>,
    failed: Vec<FailedCode>,
}

#[derive(Serialize)]
struct IndexStats {
    adcode: String,
    regions: usize,
    polygons: usize,
    children: usize,
}

#[derive(Serialize)]
struct FailedCode {
    adcode: String,
    parent: String,
    reason: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let overrides = Overrides {
        data_dir: args.data_dir.clone(),
        root_adcode: args.root.clone(),
        keys: args.keys.clone(),
        delimiter: args.delimiter.clone(),
        max_levels: args.max_levels,
    };
    let config = overrides.resolve(args.config.as_deref())?;

    info!(
        "Loading boundaries for {} from {}",
        config.root_adcode,
        config.data_dir.display()
    );
    let build = config.build_hierarchy()?;
    for failure in build.unexpected_failures() {
        warn!("{} left out: {}", failure.adcode, failure.error);
    }

    if args.stats {
        let stats = hierarchy_stats(&build);
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let lat = args.lat.context("latitude is required")?;
    let lon = args.lon.context("longitude is required")?;

    let locator = config.locator(build.into_geo());
    let levels = locator.find_loc(lat, lon);
    if levels.is_empty() {
        warn!("({}, {}) is outside every known region", lat, lon);
    }
    println!("{}", serde_json::to_string_pretty(&levels)?);

    Ok(())
}

fn hierarchy_stats(build: &HierarchyBuild) -> HierarchyStats {
    let geo = build.geo();
    let indexes = geo
        .codes()
        .into_iter()
        .filter_map(|code| {
            geo.get(code).map(|index| IndexStats {
                adcode: code.to_string(),
                regions: index.len(),
                polygons: index.polygon_count(),
                children: index.adcodes().len(),
            })
        })
        .collect();

    let mut missing = Vec::new();
    let mut failed = Vec::new();
    for failure in build.failures() {
        if failure.error.is_missing_source() {
            missing.push(failure.adcode.clone());
        } else {
            failed.push(FailedCode {
                adcode: failure.adcode.clone(),
                parent: failure.parent.clone(),
                reason: failure.error.to_string(),
            });
        }
    }
    missing.sort();

    HierarchyStats {
        root: geo.root().to_string(),
        indexes,
        missing,
        failed,
    }
}
