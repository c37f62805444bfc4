//! Tunables for steric height runs.
//!
//! A region directory may carry a `steric.toml`; every key is optional and
//! falls back to the archive defaults:
//!
//! ```toml
//! rho_0 = 1027.5
//! gravity = 9.81
//! theta_dir = "Theta"
//! salt_dir = "Salt"
//! output_dir = "dyn"
//! grid_dir = "grid"
//! # reference_latitude = 35.0
//! # vertical_grid_fallback = "/data/llc4320/grid"
//! # n_levels = 88
//! parallel = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::error::StericError;
use crate::equations::RHO_0;

/// File name looked up in the region directory.
pub const CONFIG_FILE_NAME: &str = "steric.toml";

/// Standard gravity (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Configuration for a steric height run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StericConfig {
    /// Reference density for the anomaly (kg/m³)
    pub rho_0: f64,
    /// Gravity used for dynamic height (m/s²)
    pub gravity: f64,
    /// Potential temperature snapshot directory, relative to the region
    pub theta_dir: String,
    /// Salinity snapshot directory, relative to the region
    pub salt_dir: String,
    /// Output directory, relative to the region
    pub output_dir: String,
    /// Grid directory, relative to the region
    pub grid_dir: String,
    /// Latitude for depth-to-pressure conversion; mean YC when unset
    pub reference_latitude: Option<f64>,
    /// Directory holding RC/RF/DRF when the region grid lacks them
    pub vertical_grid_fallback: Option<PathBuf>,
    /// Integrate only the top `n` levels; snapshots keep the hFacC file's depth
    pub n_levels: Option<usize>,
    /// Process snapshot pairs concurrently (needs the `parallel` feature)
    pub parallel: bool,
}

impl Default for StericConfig {
    fn default() -> Self {
        Self {
            rho_0: RHO_0,
            gravity: GRAVITY,
            theta_dir: "Theta".to_string(),
            salt_dir: "Salt".to_string(),
            output_dir: "dyn".to_string(),
            grid_dir: "grid".to_string(),
            reference_latitude: None,
            vertical_grid_fallback: None,
            n_levels: None,
            parallel: false,
        }
    }
}

impl StericConfig {
    /// Parse and validate a TOML document. `path` is used in error messages.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, StericError> {
        let config: Self = toml::from_str(text).map_err(|e| StericError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self, StericError> {
        let text = std::fs::read_to_string(path).map_err(|e| StericError::io(path, e))?;
        Self::from_toml_str(&text, path)
    }

    /// Read `<region_dir>/steric.toml`, or use defaults when it is absent.
    pub fn load_or_default(region_dir: &Path) -> Result<Self, StericError> {
        let path = region_dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!(path = %path.display(), "loading configuration");
            Self::load(&path)
        } else {
            debug!(dir = %region_dir.display(), "no {CONFIG_FILE_NAME}, using defaults");
            Ok(Self::default())
        }
    }

    /// Check physical ranges and directory names.
    pub fn validate(&self, path: &Path) -> Result<(), StericError> {
        let fail = |reason: String| StericError::Config {
            path: path.to_path_buf(),
            reason,
        };

        if !(self.rho_0.is_finite() && self.rho_0 > 0.0) {
            return Err(fail(format!("rho_0 must be positive, got {}", self.rho_0)));
        }
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(fail(format!("gravity must be positive, got {}", self.gravity)));
        }
        if let Some(lat) = self.reference_latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(fail(format!("reference_latitude {lat} outside [-90, 90]")));
            }
        }
        if self.n_levels == Some(0) {
            return Err(fail("n_levels must be at least 1".to_string()));
        }
        for (key, value) in [
            ("theta_dir", &self.theta_dir),
            ("salt_dir", &self.salt_dir),
            ("output_dir", &self.output_dir),
            ("grid_dir", &self.grid_dir),
        ] {
            if value.is_empty() || value.contains(['/', '\\']) {
                return Err(fail(format!("{key} must be a single directory name, got {value:?}")));
            }
        }
        if self.output_dir == self.theta_dir || self.output_dir == self.salt_dir {
            return Err(fail(format!(
                "output_dir {:?} would overwrite input snapshots",
                self.output_dir
            )));
        }
        Ok(())
    }

    /// Set the reference density.
    pub fn with_rho_0(mut self, rho_0: f64) -> Self {
        self.rho_0 = rho_0;
        self
    }

    /// Set gravity.
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Fix the reference latitude instead of using mean YC.
    pub fn with_reference_latitude(mut self, lat: f64) -> Self {
        self.reference_latitude = Some(lat);
        self
    }

    /// Look for vertical profiles in `dir` when the region lacks them.
    pub fn with_vertical_grid_fallback<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.vertical_grid_fallback = Some(dir.into());
        self
    }

    /// Process pairs on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// `<region_dir>/<grid_dir>`.
    pub fn grid_path(&self, region_dir: &Path) -> PathBuf {
        region_dir.join(&self.grid_dir)
    }

    /// `<region_dir>/<theta_dir>`.
    pub fn theta_path(&self, region_dir: &Path) -> PathBuf {
        region_dir.join(&self.theta_dir)
    }

    /// `<region_dir>/<salt_dir>`.
    pub fn salt_path(&self, region_dir: &Path) -> PathBuf {
        region_dir.join(&self.salt_dir)
    }

    /// `<region_dir>/<output_dir>`.
    pub fn output_path(&self, region_dir: &Path) -> PathBuf {
        region_dir.join(&self.output_dir)
    }
}
