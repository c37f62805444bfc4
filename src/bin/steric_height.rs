//! Compute steric height for every snapshot pair of one region.
//!
//! ```text
//! steric-height /data/regions/CalSWOT
//! ```
//!
//! Tunables are read from `<region_dir>/steric.toml` when present. Log level
//! follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use llc_steric::steric::{StericConfig, run_region};

/// Steric height for an LLC4320 region
#[derive(Parser)]
#[command(name = "steric-height")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compute steric height from Theta/Salt snapshots", long_about = None)]
struct Cli {
    /// Region directory containing grid/, Theta/ and Salt/
    region_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = StericConfig::load_or_default(&cli.region_dir)
        .with_context(|| format!("loading configuration for {}", cli.region_dir.display()))?;
    let summary = run_region(&cli.region_dir, &config)
        .with_context(|| format!("steric height failed for {}", cli.region_dir.display()))?;

    info!(
        "done: {} pairs in {:.2} min",
        summary.n_pairs,
        summary.wall_time / 60.0
    );
    Ok(())
}
