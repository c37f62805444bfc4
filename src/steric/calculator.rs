//! Steric height from potential temperature and salinity snapshots.
//!
//! For every column the steric height at level k is the negative cumulative
//! integral of the density anomaly from the surface down to that level:
//!
//! ```text
//! η_s[k] = -Σ_{j<=k} (ρ(S_j, θ_j, p_j) - ρ₀) / ρ₀ · DRF[j] · hFacC[j]
//! ```
//!
//! Pressure `p_j` depends only on the level, so it is computed once per region
//! from RC and a reference latitude. No free-surface term is added.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::config::StericConfig;
use super::error::StericError;
use crate::equations::{EosError, Jmd95, SeawaterDensity, pressure_profile};
use crate::io::{MappedField, write_be_f32_to};
use crate::region::{RegionDims, RegionGrid};
use crate::vertical::MaskedThickness;

/// Integrate a relative density anomaly `(ρ - ρ₀)/ρ₀` into steric height.
///
/// `anomaly` is laid out like the thickness, (n_levels, n_columns) row-major.
/// Accumulation is done in `f64`.
///
/// # Example
/// ```
/// use llc_steric::steric::integrate_anomaly;
/// use llc_steric::vertical::MaskedThickness;
///
/// let dz = MaskedThickness::from_values(2, 1, vec![10.0, 10.0]).unwrap();
/// let eta = integrate_anomaly(&[0.01, 0.02], &dz).unwrap();
/// assert!((eta[0] + 0.1).abs() < 1e-6);
/// assert!((eta[1] + 0.3).abs() < 1e-6);
/// ```
pub fn integrate_anomaly(anomaly: &[f32], thickness: &MaskedThickness) -> Result<Vec<f32>, StericError> {
    let n_columns = thickness.n_columns();
    let expected = thickness.n_levels() * n_columns;
    if anomaly.len() != expected {
        return Err(StericError::FieldLength {
            expected,
            actual: anomaly.len(),
        });
    }

    let mut cumulative = vec![0.0f64; n_columns];
    let mut out = Vec::with_capacity(expected);
    for (k, level) in anomaly.chunks_exact(n_columns).enumerate() {
        for ((acc, &a), &dz) in cumulative.iter_mut().zip(level).zip(thickness.level(k)) {
            *acc -= f64::from(a) * f64::from(dz);
            out.push(*acc as f32);
        }
    }
    Ok(out)
}

/// Convert steric height (m) to dynamic height (m²/s²).
#[inline]
pub fn dynamic_height(steric_height: f64, gravity: f64) -> f64 {
    gravity * steric_height
}

/// Path of the in-progress output written next to `output`.
fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    output.with_file_name(name)
}

/// Steric height calculator for one region.
///
/// Holds only what the integration needs: the effective thickness and the
/// per-level pressure. The [`RegionGrid`] it was built from can be dropped.
#[derive(Clone, Debug)]
pub struct StericHeightCalculator<E = Jmd95> {
    eos: E,
    dims: RegionDims,
    stored_levels: usize,
    thickness: MaskedThickness,
    pressure: Vec<f64>,
    reference_latitude: f64,
    rho_0: f64,
    gravity: f64,
}

impl StericHeightCalculator<Jmd95> {
    /// Build a calculator using the JMD95 equation of state.
    pub fn new(grid: &RegionGrid, config: &StericConfig) -> Result<Self, StericError> {
        Self::with_equation_of_state(grid, config, Jmd95)
    }
}

impl<E: SeawaterDensity> StericHeightCalculator<E> {
    /// Build a calculator with a custom equation of state.
    pub fn with_equation_of_state(
        grid: &RegionGrid,
        config: &StericConfig,
        eos: E,
    ) -> Result<Self, StericError> {
        let thickness = grid.effective_thickness()?;
        let reference_latitude = config
            .reference_latitude
            .unwrap_or_else(|| grid.mean_latitude());
        let pressure = pressure_profile(grid.vertical().rc(), reference_latitude);

        debug!(
            nlon = grid.dims().nlon,
            nlat = grid.dims().nlat,
            nz = grid.dims().nz,
            reference_latitude,
            bottom_pressure = pressure.last().copied().unwrap_or(0.0),
            "steric calculator ready"
        );

        Ok(Self {
            eos,
            dims: grid.dims(),
            stored_levels: grid.stored_levels(),
            thickness,
            pressure,
            reference_latitude,
            rho_0: config.rho_0,
            gravity: config.gravity,
        })
    }

    /// Region extents.
    pub fn dims(&self) -> RegionDims {
        self.dims
    }

    /// Levels in the snapshot files; the top `dims().nz` are integrated.
    pub fn stored_levels(&self) -> usize {
        self.stored_levels
    }

    /// Effective cell thickness.
    pub fn thickness(&self) -> &MaskedThickness {
        &self.thickness
    }

    /// Pressure at each level center (dbar).
    pub fn pressure(&self) -> &[f64] {
        &self.pressure
    }

    /// Latitude used for the pressure profile.
    pub fn reference_latitude(&self) -> f64 {
        self.reference_latitude
    }

    /// Reference density (kg/m³).
    pub fn rho_0(&self) -> f64 {
        self.rho_0
    }

    /// Dynamic height (m²/s²) for a steric height using the configured gravity.
    pub fn dynamic_height(&self, steric_height: f64) -> f64 {
        dynamic_height(steric_height, self.gravity)
    }

    /// Add level `k` to the running column sums and write it into `out`.
    ///
    /// Dry cells contribute exactly zero and are never passed to the equation
    /// of state. On failure returns the offending column.
    fn integrate_level(
        &self,
        k: usize,
        theta: &[f32],
        salt: &[f32],
        cumulative: &mut [f64],
        out: &mut [f32],
    ) -> Result<(), (usize, EosError)> {
        let p = self.pressure[k];
        let dz = self.thickness.level(k);
        for column in 0..cumulative.len() {
            let h = f64::from(dz[column]);
            if h != 0.0 {
                let rho = self
                    .eos
                    .density(f64::from(salt[column]), f64::from(theta[column]), p)
                    .map_err(|e| (column, e))?;
                cumulative[column] -= (rho - self.rho_0) / self.rho_0 * h;
            }
            out[column] = cumulative[column] as f32;
        }
        Ok(())
    }

    /// Steric height profile of in-memory fields laid out as
    /// (stored levels, Nx*Ny). The result has `dims().nz` levels.
    pub fn profile(&self, theta: &[f32], salt: &[f32]) -> Result<Vec<f32>, StericError> {
        let n_columns = self.dims.n_columns();
        let expected = self.stored_levels * n_columns;
        for len in [theta.len(), salt.len()] {
            if len != expected {
                return Err(StericError::FieldLength {
                    expected,
                    actual: len,
                });
            }
        }

        let mut cumulative = vec![0.0f64; n_columns];
        let mut out = vec![0.0f32; self.dims.n_cells()];
        for (k, level_out) in out.chunks_exact_mut(n_columns).enumerate() {
            let range = k * n_columns..(k + 1) * n_columns;
            self.integrate_level(k, &theta[range.clone()], &salt[range], &mut cumulative, level_out)
                .map_err(|(column, source)| StericError::Density {
                    level: k,
                    column,
                    source,
                })?;
        }
        Ok(out)
    }

    /// Compute steric height for one snapshot pair and write it to `output`.
    ///
    /// Both inputs are mapped with shape (stored levels, Nx*Ny) and unmapped
    /// before returning. The output holds the top `dims().nz` levels. The output is written to a `.partial` sibling and renamed
    /// into place only when every level has been written.
    ///
    /// # Errors
    /// - `Binary` if either input does not match the region shape
    /// - `Computation` naming the pair, level and column on EOS failure
    /// - `Io` on output failures
    pub fn compute(&self, theta: &Path, salt: &Path, output: &Path) -> Result<(), StericError> {
        let shape = [self.stored_levels, self.dims.n_columns()];
        let theta_field = MappedField::open(theta, &shape)?;
        let salt_field = MappedField::open(salt, &shape)?;

        let partial = partial_path(output);
        let result = self.write_profile(&theta_field, &salt_field, &partial);
        theta_field.close();
        salt_field.close();

        match result {
            Ok(()) => std::fs::rename(&partial, output).map_err(|e| StericError::io(output, e)),
            Err(e) => {
                // The compute error is reported; cleanup failure is not.
                let _ = std::fs::remove_file(&partial);
                Err(e)
            }
        }
    }

    fn write_profile(
        &self,
        theta: &MappedField,
        salt: &MappedField,
        partial: &Path,
    ) -> Result<(), StericError> {
        let n_columns = self.dims.n_columns();
        let file = File::create(partial).map_err(|e| StericError::io(partial, e))?;
        let mut writer = BufWriter::new(file);

        let mut theta_level = vec![0.0f32; n_columns];
        let mut salt_level = vec![0.0f32; n_columns];
        let mut out_level = vec![0.0f32; n_columns];
        let mut cumulative = vec![0.0f64; n_columns];

        for k in 0..self.dims.nz {
            theta.slab_into(k, &mut theta_level);
            salt.slab_into(k, &mut salt_level);
            self.integrate_level(k, &theta_level, &salt_level, &mut cumulative, &mut out_level)
                .map_err(|(column, source)| StericError::Computation {
                    theta: theta.path().to_path_buf(),
                    salt: salt.path().to_path_buf(),
                    level: k,
                    column,
                    source,
                })?;
            write_be_f32_to(&mut writer, &out_level).map_err(|e| StericError::io(partial, e))?;
        }

        writer.flush().map_err(|e| StericError::io(partial, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::LinearEquationOfState;
    use crate::io::{read_be_f32, write_be_f32};
    use crate::vertical::ZLevelGrid;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    /// Returns `ρ₀ (1 + S)` so that the anomaly equals the salinity value.
    struct AnomalyFromSalinity;

    impl SeawaterDensity for AnomalyFromSalinity {
        fn density(&self, salinity: f64, _theta: f64, _pressure: f64) -> Result<f64, EosError> {
            Ok(1027.5 * (1.0 + salinity))
        }
    }

    /// 2 columns, 2 levels of 10 m, second column dry below the surface.
    fn grid() -> RegionGrid {
        let vertical = ZLevelGrid::new(vec![-5.0, -15.0], vec![10.0, 10.0]).unwrap();
        RegionGrid::from_parts(
            RegionDims::new(2, 1, 2),
            vec![0.0, 1.0],
            vec![30.0, 30.0],
            vertical,
            vec![1.0, 1.0, 1.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_integrate_anomaly_single_column() {
        let dz = MaskedThickness::from_values(2, 1, vec![10.0, 10.0]).unwrap();
        let eta = integrate_anomaly(&[0.01, 0.02], &dz).unwrap();
        assert_relative_eq!(eta[0], -0.1, epsilon = 1e-6);
        assert_relative_eq!(eta[1], -0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_integrate_anomaly_length_checked() {
        let dz = MaskedThickness::from_values(2, 1, vec![10.0, 10.0]).unwrap();
        assert!(matches!(
            integrate_anomaly(&[0.01], &dz),
            Err(StericError::FieldLength { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_dry_cell_contributes_nothing() {
        let calc =
            StericHeightCalculator::with_equation_of_state(&grid(), &StericConfig::default(), AnomalyFromSalinity)
                .unwrap();
        // Dry cell salinity is garbage; it must never reach the EOS.
        let salt = [0.01, 0.01, 0.02, f32::NAN];
        let eta = calc.profile(&[0.0; 4], &salt).unwrap();
        assert_relative_eq!(eta[0], -0.1, epsilon = 1e-6);
        assert_relative_eq!(eta[2], -0.3, epsilon = 1e-6);
        assert_eq!(eta[1], eta[3]);
    }

    #[test]
    fn test_profile_matches_kernel() {
        let config = StericConfig::default();
        let calc = StericHeightCalculator::with_equation_of_state(&grid(), &config, AnomalyFromSalinity).unwrap();
        let salt = [0.01, -0.02, 0.02, 0.0];
        let eta = calc.profile(&[0.0; 4], &salt).unwrap();
        let expected = integrate_anomaly(&salt, calc.thickness()).unwrap();
        for (a, b) in eta.iter().zip(&expected) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_light_water_raises_steric_height() {
        // Warm water under a linear EOS is lighter than the reference.
        let eos = LinearEquationOfState::new();
        let calc = StericHeightCalculator::with_equation_of_state(&grid(), &StericConfig::default(), eos).unwrap();
        let eta = calc.profile(&[20.0; 4], &[35.0; 4]).unwrap();
        assert!(eta[0] > 0.0);
        assert!(eta[2] > eta[0]);
    }

    #[test]
    fn test_pressure_uses_reference_latitude() {
        let config = StericConfig::default().with_reference_latitude(60.0);
        let calc = StericHeightCalculator::new(&grid(), &config).unwrap();
        assert_eq!(calc.reference_latitude(), 60.0);
        assert_eq!(calc.pressure().len(), 2);
        assert!(calc.pressure()[1] > calc.pressure()[0]);

        let mean = StericHeightCalculator::new(&grid(), &StericConfig::default()).unwrap();
        assert_relative_eq!(mean.reference_latitude(), 30.0);
    }

    #[test]
    fn test_dynamic_height() {
        let calc = StericHeightCalculator::new(&grid(), &StericConfig::default().with_gravity(10.0)).unwrap();
        assert_relative_eq!(calc.dynamic_height(-0.3), -3.0);
        assert_relative_eq!(dynamic_height(0.5, 9.81), 4.905);
    }

    #[test]
    fn test_compute_writes_file_and_cleans_up() {
        let dir = tempdir().unwrap();
        let theta = dir.path().join("theta");
        let salt = dir.path().join("salt");
        let out = dir.path().join("eta");
        write_be_f32(&theta, &[0.0; 4]).unwrap();
        write_be_f32(&salt, &[0.01, 0.0, 0.02, 0.0]).unwrap();

        let calc =
            StericHeightCalculator::with_equation_of_state(&grid(), &StericConfig::default(), AnomalyFromSalinity)
                .unwrap();
        calc.compute(&theta, &salt, &out).unwrap();

        let eta = read_be_f32(&out, 4).unwrap();
        assert_relative_eq!(eta[2], -0.3, epsilon = 1e-6);
        assert!(!partial_path(&out).exists());
    }

    #[test]
    fn test_compute_failure_leaves_no_output() {
        let dir = tempdir().unwrap();
        let theta = dir.path().join("theta");
        let salt = dir.path().join("salt");
        let out = dir.path().join("eta");
        write_be_f32(&theta, &[10.0; 4]).unwrap();
        write_be_f32(&salt, &[35.0, 35.0, -1.0, 35.0]).unwrap();

        let calc = StericHeightCalculator::new(&grid(), &StericConfig::default()).unwrap();
        let err = calc.compute(&theta, &salt, &out).unwrap_err();
        match err {
            StericError::Computation {
                level,
                column,
                source,
                ..
            } => {
                assert_eq!((level, column), (1, 0));
                assert_eq!(source, EosError::NegativeSalinity(-1.0));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!out.exists());
        assert!(!partial_path(&out).exists());
    }

    #[test]
    fn test_truncated_grid_reads_full_snapshots() {
        let dir = tempdir().unwrap();
        let theta = dir.path().join("theta");
        let salt = dir.path().join("salt");
        let out = dir.path().join("eta");
        write_be_f32(&theta, &[0.0; 4]).unwrap();
        write_be_f32(&salt, &[0.01, 0.0, 0.02, 0.0]).unwrap();

        let top = grid().truncated(1).unwrap();
        let calc =
            StericHeightCalculator::with_equation_of_state(&top, &StericConfig::default(), AnomalyFromSalinity)
                .unwrap();
        assert_eq!((calc.dims().nz, calc.stored_levels()), (1, 2));

        calc.compute(&theta, &salt, &out).unwrap();
        let eta = read_be_f32(&out, 2).unwrap();
        assert_relative_eq!(eta[0], -0.1, epsilon = 1e-6);
        assert_eq!(eta[1], 0.0);

        let profile = calc.profile(&[0.0; 4], &[0.01, 0.0, 0.02, 0.0]).unwrap();
        assert_eq!(profile.len(), 2);
        assert!(matches!(
            calc.profile(&[0.0; 2], &[0.0; 2]),
            Err(StericError::FieldLength { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/r/dyn/Theta_20110913T000000")),
            PathBuf::from("/r/dyn/Theta_20110913T000000.partial")
        );
    }
}
