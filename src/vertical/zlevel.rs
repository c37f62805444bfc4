//! Geopotential (z-level) vertical grid with partial cells.
//!
//! MITgcm describes its vertical grid with two profiles shared by every
//! horizontal column:
//!
//! - `RC[k]`: height of the center of level k (negative below the surface)
//! - `DRF[k]`: thickness of level k
//!
//! Topography enters through `hFacC[k, i]`, the open fraction of cell
//! (k, i). A cell fully inside land or below the sea floor has `hFacC = 0`;
//! a bottom cell cut by the bathymetry has `0 < hFacC < 1`.
//!
//! Level 0 is the surface layer and index increases downward.

use thiserror::Error;

/// Error type for inconsistent vertical grid input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerticalGridError {
    /// `RC` and `DRF` describe different level counts
    #[error("RC has {rc} levels but DRF has {drf}")]
    LevelCount { rc: usize, drf: usize },

    /// Open-cell fraction does not cover `n_levels * n_columns` cells
    #[error("hFacC has {actual} values, expected {n_levels} x {n_columns}")]
    MaskSize {
        n_levels: usize,
        n_columns: usize,
        actual: usize,
    },

    /// More levels requested than the profile holds
    #[error("cannot keep {requested} levels of a {available}-level grid")]
    Truncate { requested: usize, available: usize },
}

/// Vertical z-level profile (cell centers and thicknesses).
#[derive(Clone, Debug, PartialEq)]
pub struct ZLevelGrid {
    rc: Vec<f32>,
    drf: Vec<f32>,
    rf: Option<Vec<f32>>,
}

impl ZLevelGrid {
    /// Create from cell-center heights and thicknesses.
    pub fn new(rc: Vec<f32>, drf: Vec<f32>) -> Result<Self, VerticalGridError> {
        if rc.len() != drf.len() {
            return Err(VerticalGridError::LevelCount {
                rc: rc.len(),
                drf: drf.len(),
            });
        }
        Ok(Self { rc, drf, rf: None })
    }

    /// Attach interface heights (`RF`), if available.
    pub fn with_interfaces(mut self, rf: Vec<f32>) -> Self {
        self.rf = Some(rf);
        self
    }

    /// Number of levels.
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.rc.len()
    }

    /// Cell-center heights.
    pub fn rc(&self) -> &[f32] {
        &self.rc
    }

    /// Cell thicknesses.
    pub fn drf(&self) -> &[f32] {
        &self.drf
    }

    /// Interface heights, if loaded.
    pub fn rf(&self) -> Option<&[f32]> {
        self.rf.as_deref()
    }

    /// Keep only the top `n_levels` levels.
    pub fn truncated(mut self, n_levels: usize) -> Result<Self, VerticalGridError> {
        if n_levels == 0 || n_levels > self.n_levels() {
            return Err(VerticalGridError::Truncate {
                requested: n_levels,
                available: self.n_levels(),
            });
        }
        self.rc.truncate(n_levels);
        self.drf.truncate(n_levels);
        if let Some(rf) = &mut self.rf {
            rf.truncate(n_levels);
        }
        Ok(self)
    }

    /// Depth of the bottom of the deepest level (sum of thicknesses).
    pub fn total_thickness(&self) -> f64 {
        self.drf.iter().map(|&d| f64::from(d)).sum()
    }

    /// Weight every cell thickness by its open fraction.
    ///
    /// `hfacc` is laid out as (n_levels, n_columns), row-major, exactly as
    /// the `hFacC` grid file.
    pub fn masked_thickness(&self, hfacc: &[f32]) -> Result<MaskedThickness, VerticalGridError> {
        let n_levels = self.n_levels();
        if n_levels == 0 || hfacc.is_empty() || hfacc.len() % n_levels != 0 {
            return Err(VerticalGridError::MaskSize {
                n_levels,
                n_columns: if n_levels == 0 { 0 } else { hfacc.len() / n_levels },
                actual: hfacc.len(),
            });
        }
        let n_columns = hfacc.len() / n_levels;

        let values = hfacc
            .chunks_exact(n_columns)
            .zip(&self.drf)
            .flat_map(|(level, &dz)| level.iter().map(move |&h| dz * h))
            .collect();

        Ok(MaskedThickness {
            n_levels,
            n_columns,
            values,
        })
    }
}

/// Effective cell thickness `DRF[k] * hFacC[k, i]` for every cell.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskedThickness {
    n_levels: usize,
    n_columns: usize,
    values: Vec<f32>,
}

impl MaskedThickness {
    /// Build directly from precomputed values laid out as (n_levels, n_columns).
    pub fn from_values(
        n_levels: usize,
        n_columns: usize,
        values: Vec<f32>,
    ) -> Result<Self, VerticalGridError> {
        if values.len() != n_levels * n_columns {
            return Err(VerticalGridError::MaskSize {
                n_levels,
                n_columns,
                actual: values.len(),
            });
        }
        Ok(Self {
            n_levels,
            n_columns,
            values,
        })
    }

    /// Number of levels.
    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    /// Number of horizontal columns (Nx * Ny).
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Thicknesses of every column at level `k`.
    #[inline]
    pub fn level(&self, k: usize) -> &[f32] {
        &self.values[k * self.n_columns..(k + 1) * self.n_columns]
    }

    /// Effective thickness of cell (k, column).
    #[inline]
    pub fn get(&self, k: usize, column: usize) -> f32 {
        self.values[k * self.n_columns + column]
    }

    /// Water depth of one column (sum of open thickness).
    pub fn column_depth(&self, column: usize) -> f64 {
        (0..self.n_levels)
            .map(|k| f64::from(self.get(k, column)))
            .sum()
    }

    /// Number of levels with non-zero open thickness in a column.
    pub fn wet_levels(&self, column: usize) -> usize {
        (0..self.n_levels)
            .filter(|&k| self.get(k, column) > 0.0)
            .count()
    }

    /// Flat view in file order.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_level_grid() -> ZLevelGrid {
        ZLevelGrid::new(vec![-5.0, -15.0, -30.0], vec![10.0, 10.0, 20.0]).unwrap()
    }

    #[test]
    fn test_level_count_mismatch() {
        assert_eq!(
            ZLevelGrid::new(vec![-5.0], vec![10.0, 10.0]),
            Err(VerticalGridError::LevelCount { rc: 1, drf: 2 })
        );
    }

    #[test]
    fn test_masked_thickness_broadcast() {
        let grid = three_level_grid();
        // Two columns: fully open, and a shelf column with a partial second cell
        let hfacc = vec![1.0, 1.0, 1.0, 0.5, 1.0, 0.0];
        let dz = grid.masked_thickness(&hfacc).unwrap();

        assert_eq!(dz.n_levels(), 3);
        assert_eq!(dz.n_columns(), 2);
        assert_eq!(dz.level(0), &[10.0, 10.0]);
        assert_eq!(dz.level(1), &[10.0, 5.0]);
        assert_eq!(dz.level(2), &[20.0, 0.0]);
        assert_eq!(dz.column_depth(0), 40.0);
        assert_eq!(dz.column_depth(1), 15.0);
        assert_eq!(dz.wet_levels(1), 2);
        assert_eq!(dz.as_slice(), &[10.0, 10.0, 10.0, 5.0, 20.0, 0.0]);
    }

    #[test]
    fn test_mask_size_checked() {
        let grid = three_level_grid();
        assert!(matches!(
            grid.masked_thickness(&[1.0; 7]),
            Err(VerticalGridError::MaskSize { actual: 7, .. })
        ));
        assert!(MaskedThickness::from_values(2, 2, vec![1.0; 3]).is_err());
    }

    #[test]
    fn test_truncated_keeps_top_levels() {
        let grid = three_level_grid().with_interfaces(vec![0.0, -10.0, -20.0]);
        let top = grid.clone().truncated(2).unwrap();
        assert_eq!(top.rc(), &[-5.0, -15.0]);
        assert_eq!(top.drf(), &[10.0, 10.0]);
        assert_eq!(top.rf(), Some(&[0.0, -10.0][..]));
        assert_eq!(
            grid.clone().truncated(4),
            Err(VerticalGridError::Truncate { requested: 4, available: 3 })
        );
        assert!(grid.truncated(0).is_err());
    }

    #[test]
    fn test_total_thickness() {
        assert_eq!(three_level_grid().total_thickness(), 40.0);
    }
}
