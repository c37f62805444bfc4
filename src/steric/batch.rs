//! Region batch driver.
//!
//! Pairs every `Theta/*` snapshot with the `Salt/*` snapshot at the same
//! position in sorted order and writes steric height to `dyn/`, keeping the
//! theta file name:
//!
//! ```text
//! CalSWOT/Theta/Theta_20110913T000000 ┐
//! CalSWOT/Salt/Salt_20110913T000000   ┴─> CalSWOT/dyn/Theta_20110913T000000
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use glob::MatchOptions;
use tracing::{info, warn};

use super::calculator::StericHeightCalculator;
use super::config::StericConfig;
use super::error::StericError;
use super::progress::{ProgressReporter, format_duration};
use crate::equations::SeawaterDensity;
use crate::region::{LlcRegion, RegionDims};

/// Theta and salt files for one model snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotPair {
    /// Potential temperature file
    pub theta: PathBuf,
    /// Salinity file
    pub salt: PathBuf,
}

impl SnapshotPair {
    /// Theta file name, used in logs.
    pub fn name(&self) -> String {
        self.theta
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of a region batch run.
#[derive(Clone, Debug)]
pub struct BatchSummary {
    /// Region directory
    pub region: PathBuf,
    /// Number of pairs processed
    pub n_pairs: usize,
    /// Files written, in pair order
    pub outputs: Vec<PathBuf>,
    /// Total wall-clock time in seconds
    pub wall_time: f64,
}

/// Sorted regular, non-hidden files directly under `dir`.
pub fn list_snapshots(dir: &Path) -> Result<Vec<PathBuf>, StericError> {
    if !dir.is_dir() {
        return Err(StericError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "snapshot directory not found"),
        ));
    }
    let pattern = format!("{}/*", glob::Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut files = Vec::new();
    for entry in glob::glob_with(&pattern, options)? {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            StericError::io(path, e.into_error())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pair theta and salt snapshots of a region index-for-index.
///
/// # Errors
/// `CountMismatch` if the two directories hold different numbers of files.
pub fn discover_pairs(region_dir: &Path, config: &StericConfig) -> Result<Vec<SnapshotPair>, StericError> {
    let theta = list_snapshots(&config.theta_path(region_dir))?;
    let salt = list_snapshots(&config.salt_path(region_dir))?;
    if theta.len() != salt.len() {
        return Err(StericError::CountMismatch {
            dir: region_dir.to_path_buf(),
            theta: theta.len(),
            salt: salt.len(),
        });
    }
    Ok(theta
        .into_iter()
        .zip(salt)
        .map(|(theta, salt)| SnapshotPair { theta, salt })
        .collect())
}

/// Output file for a theta snapshot: its parent directory is swapped for the
/// output directory and the file name kept.
pub fn output_path(theta_file: &Path, config: &StericConfig) -> Result<PathBuf, StericError> {
    let fail = |reason: String| StericError::OutputPath {
        path: theta_file.to_path_buf(),
        reason,
    };

    let name = theta_file
        .file_name()
        .ok_or_else(|| fail("no file name".to_string()))?;
    let parent = theta_file
        .parent()
        .ok_or_else(|| fail("no parent directory".to_string()))?;
    if parent.file_name().is_none_or(|n| n != config.theta_dir.as_str()) {
        return Err(fail(format!("not inside a {:?} directory", config.theta_dir)));
    }
    let region = parent.parent().unwrap_or_else(|| Path::new(""));
    Ok(region.join(&config.output_dir).join(name))
}

/// Compute steric height for every pair with a prepared calculator.
///
/// The output directory of each pair is created if missing. Runs on the rayon
/// pool when `config.parallel` is set and the `parallel` feature is enabled.
pub fn run_pairs<E: SeawaterDensity>(
    calculator: &StericHeightCalculator<E>,
    pairs: &[SnapshotPair],
    config: &StericConfig,
) -> Result<Vec<PathBuf>, StericError> {
    let outputs = pairs
        .iter()
        .map(|pair| output_path(&pair.theta, config))
        .collect::<Result<Vec<_>, _>>()?;
    let dirs: BTreeSet<&Path> = outputs.iter().filter_map(|p| p.parent()).collect();
    for dir in dirs {
        std::fs::create_dir_all(dir).map_err(|e| StericError::io(dir, e))?;
    }

    let reporter = ProgressReporter::new(pairs.len());
    let process = |(pair, output): (&SnapshotPair, &PathBuf)| -> Result<(), StericError> {
        calculator.compute(&pair.theta, &pair.salt, output)?;
        reporter.record(&pair.name());
        Ok(())
    };

    if config.parallel {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            pairs.par_iter().zip(outputs.par_iter()).try_for_each(process)?;
            return Ok(outputs);
        }
        #[cfg(not(feature = "parallel"))]
        warn!("parallel requested but the crate was built without the `parallel` feature");
    }

    pairs.iter().zip(outputs.iter()).try_for_each(process)?;
    Ok(outputs)
}

/// Process a whole region directory.
///
/// Loads the grid once, builds the calculator, releases the grid and then
/// processes every snapshot pair.
pub fn run_region(region_dir: &Path, config: &StericConfig) -> Result<BatchSummary, StericError> {
    let start = Instant::now();
    config.validate(region_dir)?;

    let grid_dir = config.grid_path(region_dir);
    let dims = RegionDims::from_grid_dir(&grid_dir)?;
    info!(
        region = %region_dir.display(),
        nlon = dims.nlon,
        nlat = dims.nlat,
        nz = dims.nz,
        "loading grid"
    );

    let mut region = LlcRegion::new(&grid_dir, region_dir, dims.nlon, dims.nlat, dims.nz);
    if let Some(fallback) = &config.vertical_grid_fallback {
        region = region.with_vertical_fallback(fallback);
    }
    let mut grid = region.into_grid()?;
    if let Some(n_levels) = config.n_levels.filter(|&n| n != dims.nz) {
        info!(n_levels, stored = dims.nz, "integrating top levels only");
        grid = grid.truncated(n_levels)?;
    }
    let calculator = StericHeightCalculator::new(&grid, config)?;
    drop(grid);

    let pairs = discover_pairs(region_dir, config)?;
    if pairs.is_empty() {
        warn!(region = %region_dir.display(), "no snapshot pairs found");
    } else {
        info!(n_pairs = pairs.len(), "processing snapshot pairs");
    }

    let outputs = run_pairs(&calculator, &pairs, config)?;
    let wall_time = start.elapsed().as_secs_f64();
    info!(
        n_pairs = outputs.len(),
        wall_time = %format_duration(wall_time),
        "region complete"
    );

    Ok(BatchSummary {
        region: region_dir.to_path_buf(),
        n_pairs: outputs.len(),
        outputs,
        wall_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_pairs_sorted_index_for_index() {
        let dir = tempdir().unwrap();
        for t in ["20110913T020000", "20110913T000000", "20110913T010000"] {
            touch(&dir.path().join(format!("Theta/Theta_{t}")));
            touch(&dir.path().join(format!("Salt/Salt_{t}")));
        }
        touch(&dir.path().join("Theta/.hidden"));

        let pairs = discover_pairs(dir.path(), &StericConfig::default()).unwrap();
        assert_eq!(pairs.len(), 3);
        assert!(pairs[0].theta.ends_with("Theta_20110913T000000"));
        assert!(pairs[0].salt.ends_with("Salt_20110913T000000"));
        assert!(pairs[2].salt.ends_with("Salt_20110913T020000"));
        assert_eq!(pairs[1].name(), "Theta_20110913T010000");
    }

    #[test]
    fn test_count_mismatch() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("Theta/Theta_a"));
        touch(&dir.path().join("Theta/Theta_b"));
        touch(&dir.path().join("Salt/Salt_a"));

        let err = discover_pairs(dir.path(), &StericConfig::default()).unwrap_err();
        assert!(matches!(err, StericError::CountMismatch { theta: 2, salt: 1, .. }));
    }

    #[test]
    fn test_missing_snapshot_dir() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            discover_pairs(dir.path(), &StericConfig::default()),
            Err(StericError::Io { .. })
        ));
    }

    #[test]
    fn test_output_path_is_structural() {
        let config = StericConfig::default();
        assert_eq!(
            output_path(Path::new("/data/Theta/Theta/Theta_20110913T000000"), &config).unwrap(),
            PathBuf::from("/data/Theta/dyn/Theta_20110913T000000")
        );
        assert!(matches!(
            output_path(Path::new("/data/Salt/Salt_20110913T000000"), &config),
            Err(StericError::OutputPath { .. })
        ));
    }
}
