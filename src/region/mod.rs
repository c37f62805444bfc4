//! Regional data access for LLC4320 subsets.
//!
//! A region is a rectangular horizontal tile of the global Lat-Lon-Cap grid
//! with a fixed number of vertical levels. Its static grid (coordinates,
//! vertical profiles, open-cell fractions) is loaded once; snapshot files are
//! memory-mapped on demand and released as soon as the caller drops them.
//!
//! # Directory Layout
//!
//! ```text
//! CalSWOT/
//!   grid/     XC_*, YC_*, hFacC_*, RC.data, DRF.data, ...
//!   Theta/    Theta_20110913T000000, ...
//!   Salt/     Salt_20110913T000000, ...
//!   dyn/      steric height output (created on demand)
//! ```

mod grid;
mod llc_region;

pub use grid::{GridError, GridField, GridSource, RegionDims, RegionGrid};
pub use llc_region::{DEFAULT_TEND, DEFAULT_TINI, LlcRegion};
