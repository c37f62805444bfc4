//! Vertical coordinate for LLC4320 regional subsets.
//!
//! LLC4320 is a z-level model: every column shares the same level heights
//! (`RC`) and thicknesses (`DRF`), and bathymetry is represented by the
//! open-cell fraction `hFacC`. The steric height integral weights each cell
//! by its effective thickness `DRF[k] * hFacC[k, i]`, so closed cells add
//! nothing and partial bottom cells add proportionally less.
//!
//! # Example
//!
//! ```
//! use llc_steric::vertical::ZLevelGrid;
//!
//! let grid = ZLevelGrid::new(vec![-5.0, -15.0], vec![10.0, 10.0]).unwrap();
//!
//! // One open column and one column blocked below the first level
//! let dz = grid.masked_thickness(&[1.0, 1.0, 1.0, 0.0]).unwrap();
//! assert_eq!(dz.level(1), &[10.0, 0.0]);
//! ```

mod zlevel;

pub use zlevel::{MaskedThickness, VerticalGridError, ZLevelGrid};
