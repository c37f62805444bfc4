//! Regional subset of the LLC4320 setup.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};

use super::grid::{GridError, GridSource, RegionDims, RegionGrid};
use crate::io::{BinaryFileError, MappedField};
use crate::time::{TimeFormatError, TimeSeries, parse_time};

/// First hourly snapshot of the LLC4320 regional archive.
pub const DEFAULT_TINI: &str = "20110913T000000";
/// Last hourly snapshot of the LLC4320 regional archive.
pub const DEFAULT_TEND: &str = "20120128T120000";

/// Parse one of the default constants; covered by `test_defaults_match_archive`.
fn default_time(ts: &str) -> NaiveDateTime {
    parse_time(ts).unwrap_or_default()
}

/// A rectangular tile of the LLC4320 ocean with its output archive.
///
/// Holds the grid and data locations, the region extents and the time
/// sampling of the archived snapshots. Snapshot files are exposed as
/// memory-mapped, shaped fields and never read eagerly.
///
/// # Example
///
/// ```ignore
/// use llc_steric::region::LlcRegion;
///
/// let mut region = LlcRegion::new("CalSWOT/grid", "CalSWOT", 960, 1754, 88)
///     .with_time_range("20111101T000000", "20111130T230000")?
///     .with_dt_hours(1.0);
///
/// region.load_grid()?;
/// let eta = region.load_2d("Eta/Eta_20111101T000000")?;
/// let theta = region.load_3d("Theta/Theta_20111101T000000")?;
/// let axis = region.init_time_series()?;
/// ```
#[derive(Debug)]
pub struct LlcRegion {
    grid_dir: PathBuf,
    data_dir: PathBuf,
    dims: RegionDims,
    tini: NaiveDateTime,
    tend: NaiveDateTime,
    dt: Duration,
    vertical_fallback: Option<PathBuf>,
    grid: Option<RegionGrid>,
}

impl LlcRegion {
    /// Describe a region of `nlon x nlat` columns and `nz` levels.
    ///
    /// Time sampling defaults to the hourly archive from
    /// [`DEFAULT_TINI`] to [`DEFAULT_TEND`].
    pub fn new<G: Into<PathBuf>, D: Into<PathBuf>>(
        grid_dir: G,
        data_dir: D,
        nlon: usize,
        nlat: usize,
        nz: usize,
    ) -> Self {
        Self {
            grid_dir: grid_dir.into(),
            data_dir: data_dir.into(),
            dims: RegionDims::new(nlon, nlat, nz),
            tini: default_time(DEFAULT_TINI),
            tend: default_time(DEFAULT_TEND),
            dt: Duration::hours(1),
            vertical_fallback: None,
            grid: None,
        }
    }

    /// Set start and end times from compact timestamps.
    pub fn with_time_range(mut self, tini: &str, tend: &str) -> Result<Self, TimeFormatError> {
        self.tini = parse_time(tini)?;
        self.tend = parse_time(tend)?;
        Ok(self)
    }

    /// Set start and end times.
    pub fn with_times(mut self, tini: NaiveDateTime, tend: NaiveDateTime) -> Self {
        self.tini = tini;
        self.tend = tend;
        self
    }

    /// Set the output interval in hours (rounded to whole seconds).
    pub fn with_dt_hours(mut self, hours: f64) -> Self {
        self.dt = Duration::seconds((hours * 3600.0).round() as i64);
        self
    }

    /// Set the output interval.
    pub fn with_dt(mut self, dt: Duration) -> Self {
        self.dt = dt;
        self
    }

    /// Directory searched for `RC`/`RF`/`DRF` when the grid directory lacks them.
    pub fn with_vertical_fallback<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.vertical_fallback = Some(dir.into());
        self
    }

    /// Region extents.
    pub fn dims(&self) -> RegionDims {
        self.dims
    }

    /// Horizontal file-name suffix, e.g. `960x1754`.
    pub fn grid_size(&self) -> String {
        self.dims.grid_size()
    }

    /// Grid directory.
    pub fn grid_dir(&self) -> &Path {
        &self.grid_dir
    }

    /// Parent data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Start time.
    pub fn tini(&self) -> NaiveDateTime {
        self.tini
    }

    /// End time.
    pub fn tend(&self) -> NaiveDateTime {
        self.tend
    }

    /// Output interval.
    pub fn dt(&self) -> Duration {
        self.dt
    }

    /// Grid source for this region.
    pub fn grid_source(&self) -> GridSource {
        let source = GridSource::new(&self.grid_dir);
        match &self.vertical_fallback {
            Some(dir) => source.with_vertical_fallback(dir),
            None => source,
        }
    }

    /// Load the static grid (once) and return it.
    pub fn load_grid(&mut self) -> Result<&RegionGrid, GridError> {
        let grid = match self.grid.take() {
            Some(grid) => grid,
            None => RegionGrid::load(&self.grid_source(), self.dims)?,
        };
        Ok(&*self.grid.insert(grid))
    }

    /// The loaded grid, if [`LlcRegion::load_grid`] has been called.
    pub fn grid(&self) -> Option<&RegionGrid> {
        self.grid.as_ref()
    }

    /// Consume the region and return its grid, loading it if needed.
    pub fn into_grid(mut self) -> Result<RegionGrid, GridError> {
        match self.grid.take() {
            Some(grid) => Ok(grid),
            None => RegionGrid::load(&self.grid_source(), self.dims),
        }
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }

    /// Map a 2D snapshot as (Nlat, Nlon).
    ///
    /// Relative paths are resolved against the data directory.
    pub fn load_2d<P: AsRef<Path>>(&self, file: P) -> Result<MappedField, BinaryFileError> {
        MappedField::open(
            self.resolve(file.as_ref()),
            &[self.dims.nlat, self.dims.nlon],
        )
    }

    /// Map a 3D snapshot as (Nz, Nlat, Nlon).
    ///
    /// Relative paths are resolved against the data directory.
    pub fn load_3d<P: AsRef<Path>>(&self, file: P) -> Result<MappedField, BinaryFileError> {
        MappedField::open(
            self.resolve(file.as_ref()),
            &[self.dims.nz, self.dims.nlat, self.dims.nlon],
        )
    }

    /// Build the inclusive snapshot time axis `tini..=tend` step `dt`.
    pub fn init_time_series(&self) -> Result<TimeSeries, TimeFormatError> {
        TimeSeries::regular(self.tini, self.tend, self.dt)
    }
}
