//! # llc-steric
//!
//! Tools for regional subsets of the LLC4320 global ocean simulation.
//!
//! This crate provides:
//! - Big-endian `f32` field files, read eagerly or memory-mapped ([`io`])
//! - Static region grids and the regional data accessor ([`region`])
//! - The z-level vertical grid with partial cells ([`vertical`])
//! - Compact timestamps and the snapshot time axis ([`time`])
//! - Seawater equation of state and depth-to-pressure conversion ([`equations`])
//! - Steric height computation and the region batch driver ([`steric`])
//! - A catalog of region grid dimensions ([`catalog`])

pub mod catalog;
pub mod equations;
pub mod io;
pub mod region;
pub mod steric;
pub mod time;
pub mod vertical;

// Re-export main types for convenience
pub use catalog::{CatalogEntry, CatalogError, CatalogScan, scan_regions, write_catalog_csv};
pub use equations::{EosError, Jmd95, SeawaterDensity, pressure_from_depth};
pub use io::{BinaryFileError, MappedField};
pub use region::{GridError, LlcRegion, RegionDims, RegionGrid};
pub use steric::{
    BatchSummary, SnapshotPair, StericConfig, StericError, StericHeightCalculator,
    integrate_anomaly, run_region,
};
pub use time::{TimeFormatError, TimeSeries, format_time, parse_time};
pub use vertical::{MaskedThickness, ZLevelGrid};
