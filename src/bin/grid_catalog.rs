//! Catalog the grid dimensions of every region under a directory.
//!
//! ```text
//! grid-catalog /data/regions regions.csv
//! grid-catalog /data/regions            # CSV on stdout
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use llc_steric::catalog::scan_regions;

/// Grid catalog builder
#[derive(Parser)]
#[command(name = "grid-catalog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Write region,Nx,Ny,Nz for every region grid", long_about = None)]
struct Cli {
    /// Root directory searched for */grid/hFacC_* files
    root: PathBuf,

    /// Output CSV file (stdout when omitted)
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let scan = scan_regions(&cli.root)
        .with_context(|| format!("scanning {}", cli.root.display()))?;
    if scan.entries.is_empty() {
        warn!(root = %cli.root.display(), "no region grids found");
    }

    match &cli.output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            scan.write_csv(&mut writer)?;
            writer.flush()?;
            info!(
                regions = scan.entries.len(),
                skipped = scan.skipped.len(),
                "wrote {}",
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            scan.write_csv(&mut stdout)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
