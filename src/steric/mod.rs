//! Steric height from LLC4320 temperature and salinity snapshots.
//!
//! Steric height is the sea-level contribution of density changes in the
//! water column. For each column it is accumulated downward from the surface
//! so every level of the output holds the contribution of the water above it.
//!
//! # Example
//!
//! ```ignore
//! use llc_steric::steric::{StericConfig, run_region};
//!
//! let region = std::path::Path::new("/data/regions/CalSWOT");
//! let config = StericConfig::load_or_default(region)?;
//! let summary = run_region(region, &config)?;
//! println!("{} pairs in {:.1}s", summary.n_pairs, summary.wall_time);
//! ```

mod batch;
mod calculator;
mod config;
mod error;
mod progress;

pub use batch::{
    BatchSummary, SnapshotPair, discover_pairs, list_snapshots, output_path, run_pairs, run_region,
};
pub use calculator::{StericHeightCalculator, dynamic_height, integrate_anomaly};
pub use config::{CONFIG_FILE_NAME, GRAVITY, StericConfig};
pub use error::StericError;
pub use progress::{ProgressReporter, format_duration};
