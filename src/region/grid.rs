//! Static per-region grid descriptors.
//!
//! A region's `grid/` directory holds one flat `>f4` file per field:
//!
//! ```text
//! grid/
//!   XC_960x1754          longitude of cell centers   (Nlat, Nlon)
//!   YC_960x1754          latitude of cell centers    (Nlat, Nlon)
//!   hFacC_960x1754x88    open-cell fraction          (Nz, Nlat*Nlon)
//!   Depth_960x1754       bathymetry (optional)       (Nlat, Nlon)
//!   RC.data, DRF.data    vertical profiles           (>= Nz)
//!   RF.data              interface heights (optional)
//! ```
//!
//! Vertical profiles are often global files covering every model level; only
//! the first Nz entries are used. They may live in a separate, explicitly
//! configured directory when the region does not carry its own copy.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::catalog::parse_hfacc_name;
use crate::io::{BinaryFileError, read_be_f32, read_be_f32_prefix};
use crate::vertical::{MaskedThickness, VerticalGridError, ZLevelGrid};

/// Error type for grid loading.
#[derive(Debug, Error)]
pub enum GridError {
    /// Size or I/O failure on a field file
    #[error(transparent)]
    Binary(#[from] BinaryFileError),

    /// A required field has no file in the grid (or fallback) directory
    #[error("missing grid file for {field} in {}", .dir.display())]
    MissingGridFile { field: &'static str, dir: PathBuf },

    /// Region dimensions could not be determined
    #[error("cannot determine region dimensions from {}: {reason}", .dir.display())]
    Dimensions { dir: PathBuf, reason: String },

    /// Vertical profiles and mask disagree
    #[error(transparent)]
    Vertical(#[from] VerticalGridError),

    /// Directory listing failed
    #[error("cannot list {}: {source}", .dir.display())]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Grid descriptor fields, identified by file-name tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridField {
    /// Longitude of cell centers
    Xc,
    /// Latitude of cell centers
    Yc,
    /// Height of vertical cell centers
    Rc,
    /// Height of vertical cell interfaces
    Rf,
    /// Vertical cell thickness
    Drf,
    /// Open fraction of tracer cells
    HFacC,
    /// Bathymetry
    Depth,
}

impl GridField {
    /// File-name tag.
    pub fn tag(self) -> &'static str {
        match self {
            GridField::Xc => "XC",
            GridField::Yc => "YC",
            GridField::Rc => "RC",
            GridField::Rf => "RF",
            GridField::Drf => "DRF",
            GridField::HFacC => "hFacC",
            GridField::Depth => "Depth",
        }
    }

    /// True if a file name belongs to this field.
    ///
    /// Accepted: `TAG`, `TAG.data`, `TAG_<suffix>`. Matching is on the file
    /// name alone, so `DRF` never matches `RF` and `XG_*` never matches `XC`.
    pub fn matches(self, file_name: &str) -> bool {
        let tag = self.tag();
        match file_name.strip_prefix(tag) {
            Some("") | Some(".data") => true,
            Some(rest) => rest.starts_with('_'),
            None => false,
        }
    }
}

/// Horizontal and vertical extents of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionDims {
    /// Number of longitude points
    pub nlon: usize,
    /// Number of latitude points
    pub nlat: usize,
    /// Number of vertical levels
    pub nz: usize,
}

impl RegionDims {
    /// Create from explicit extents.
    pub fn new(nlon: usize, nlat: usize, nz: usize) -> Self {
        Self { nlon, nlat, nz }
    }

    /// Infer extents from the `hFacC_{Nx}x{Ny}x{Nz}` file in a grid directory.
    pub fn from_grid_dir(dir: &Path) -> Result<Self, GridError> {
        let path = find_field(dir, GridField::HFacC, None)?.ok_or_else(|| {
            GridError::MissingGridFile {
                field: GridField::HFacC.tag(),
                dir: dir.to_path_buf(),
            }
        })?;
        let name = file_name(&path);
        parse_hfacc_name(name)
            .map(|(nlon, nlat, nz)| Self::new(nlon, nlat, nz))
            .ok_or_else(|| GridError::Dimensions {
                dir: dir.to_path_buf(),
                reason: format!("{name} does not follow hFacC_{{Nx}}x{{Ny}}x{{Nz}}"),
            })
    }

    /// Suffix of horizontal grid file names, e.g. `960x1754`.
    pub fn grid_size(&self) -> String {
        format!("{}x{}", self.nlon, self.nlat)
    }

    /// Number of horizontal columns (Nlon * Nlat).
    pub fn n_columns(&self) -> usize {
        self.nlon * self.nlat
    }

    /// Number of values in one 3D snapshot.
    pub fn n_cells(&self) -> usize {
        self.nz * self.n_columns()
    }
}

/// Where to look for grid files.
#[derive(Clone, Debug)]
pub struct GridSource {
    dir: PathBuf,
    vertical_fallback: Option<PathBuf>,
}

impl GridSource {
    /// Look in `dir` only.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            vertical_fallback: None,
        }
    }

    /// Also look for `RC`/`RF`/`DRF` in `dir` when the region lacks them.
    pub fn with_vertical_fallback<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.vertical_fallback = Some(dir.into());
        self
    }

    /// Region grid directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn find_vertical(&self, field: GridField) -> Result<Option<PathBuf>, GridError> {
        if let Some(path) = find_field(&self.dir, field, None)? {
            return Ok(Some(path));
        }
        match &self.vertical_fallback {
            Some(fallback) => {
                let found = find_field(fallback, field, None)?;
                if let Some(path) = &found {
                    debug!(field = field.tag(), path = %path.display(), "using fallback vertical grid file");
                }
                Ok(found)
            }
            None => Ok(None),
        }
    }

    fn missing(&self, field: GridField) -> GridError {
        GridError::MissingGridFile {
            field: field.tag(),
            dir: self.dir.clone(),
        }
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Locate the file for `field` in `dir`.
///
/// When several files match, one whose name contains `prefer` wins; ties are
/// broken by lexicographic order so the choice is deterministic.
fn find_field(
    dir: &Path,
    field: GridField,
    prefer: Option<&str>,
) -> Result<Option<PathBuf>, GridError> {
    let entries = std::fs::read_dir(dir).map_err(|source| GridError::Io {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GridError::Io {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && field.matches(file_name(&path)) {
            candidates.push(path);
        }
    }
    candidates.sort();

    if let Some(prefer) = prefer {
        if let Some(i) = candidates.iter().position(|p| file_name(p).contains(prefer)) {
            return Ok(Some(candidates.swap_remove(i)));
        }
    }
    Ok(candidates.into_iter().next())
}

/// Static grid of one region, held read-only for a batch run.
#[derive(Clone, Debug)]
pub struct RegionGrid {
    dims: RegionDims,
    stored_levels: usize,
    lon: Vec<f32>,
    lat: Vec<f32>,
    vertical: ZLevelGrid,
    hfacc: Vec<f32>,
    depth: Option<Vec<f32>>,
}

impl RegionGrid {
    /// Load every descriptor for a region of extent `dims`.
    ///
    /// # Errors
    /// - `MissingGridFile` if XC, YC, RC, DRF or hFacC cannot be found
    /// - `Binary(ShapeMismatch)` if any file disagrees with `dims`
    pub fn load(source: &GridSource, dims: RegionDims) -> Result<Self, GridError> {
        let grid_size = dims.grid_size();
        let n_columns = dims.n_columns();

        let horizontal = |field: GridField| -> Result<Option<Vec<f32>>, GridError> {
            match find_field(source.dir(), field, Some(&grid_size))? {
                Some(path) => Ok(Some(read_be_f32(&path, n_columns)?)),
                None => Ok(None),
            }
        };

        let lon = horizontal(GridField::Xc)?.ok_or_else(|| source.missing(GridField::Xc))?;
        let lat = horizontal(GridField::Yc)?.ok_or_else(|| source.missing(GridField::Yc))?;

        let depth = horizontal(GridField::Depth)?;
        if depth.is_none() {
            debug!(dir = %source.dir().display(), "no bathymetry file, leaving depth unset");
        }

        let vertical_profile = |field: GridField| -> Result<Option<Vec<f32>>, GridError> {
            match source.find_vertical(field)? {
                Some(path) => Ok(Some(read_be_f32_prefix(&path, dims.nz)?)),
                None => Ok(None),
            }
        };

        let rc = vertical_profile(GridField::Rc)?.ok_or_else(|| source.missing(GridField::Rc))?;
        let drf = vertical_profile(GridField::Drf)?.ok_or_else(|| source.missing(GridField::Drf))?;
        let mut vertical = ZLevelGrid::new(rc, drf)?;
        match vertical_profile(GridField::Rf)? {
            Some(rf) => vertical = vertical.with_interfaces(rf),
            None => debug!(dir = %source.dir().display(), "no RF file, interfaces unset"),
        }

        let hfacc_path = find_field(source.dir(), GridField::HFacC, Some(&grid_size))?
            .ok_or_else(|| source.missing(GridField::HFacC))?;
        let hfacc = read_be_f32(&hfacc_path, dims.n_cells())?;

        Ok(Self {
            dims,
            stored_levels: dims.nz,
            lon,
            lat,
            vertical,
            hfacc,
            depth,
        })
    }

    /// Assemble a grid from in-memory fields, checking every size.
    pub fn from_parts(
        dims: RegionDims,
        lon: Vec<f32>,
        lat: Vec<f32>,
        vertical: ZLevelGrid,
        hfacc: Vec<f32>,
    ) -> Result<Self, GridError> {
        let horizontal_ok = lon.len() == dims.n_columns() && lat.len() == dims.n_columns();
        if !horizontal_ok || vertical.n_levels() != dims.nz || hfacc.len() != dims.n_cells() {
            return Err(GridError::Dimensions {
                dir: PathBuf::new(),
                reason: format!(
                    "fields do not match {}x{}x{} (lon {}, lat {}, levels {}, hFacC {})",
                    dims.nlon,
                    dims.nlat,
                    dims.nz,
                    lon.len(),
                    lat.len(),
                    vertical.n_levels(),
                    hfacc.len()
                ),
            });
        }
        Ok(Self {
            dims,
            stored_levels: dims.nz,
            lon,
            lat,
            vertical,
            hfacc,
            depth: None,
        })
    }

    /// Keep only the top `n_levels` levels of the vertical grid and mask.
    ///
    /// Snapshot files keep their full depth; [`RegionGrid::stored_levels`]
    /// still reports the level count they are laid out with.
    pub fn truncated(mut self, n_levels: usize) -> Result<Self, GridError> {
        self.vertical = self.vertical.truncated(n_levels)?;
        self.hfacc.truncate(n_levels * self.dims.n_columns());
        self.dims.nz = n_levels;
        Ok(self)
    }

    /// Region extents.
    pub fn dims(&self) -> RegionDims {
        self.dims
    }

    /// Number of levels in the region's snapshot files.
    pub fn stored_levels(&self) -> usize {
        self.stored_levels
    }

    /// Cell-center longitudes, (Nlat, Nlon) row-major.
    pub fn lon(&self) -> &[f32] {
        &self.lon
    }

    /// Cell-center latitudes, (Nlat, Nlon) row-major.
    pub fn lat(&self) -> &[f32] {
        &self.lat
    }

    /// Vertical z-level profile.
    pub fn vertical(&self) -> &ZLevelGrid {
        &self.vertical
    }

    /// Open-cell fraction, (Nz, Nlat*Nlon) row-major.
    pub fn hfacc(&self) -> &[f32] {
        &self.hfacc
    }

    /// Bathymetry, if the region provides it.
    pub fn depth(&self) -> Option<&[f32]> {
        self.depth.as_deref()
    }

    /// Mean latitude over all cells; reference latitude for pressure.
    pub fn mean_latitude(&self) -> f64 {
        let sum: f64 = self.lat.iter().map(|&v| f64::from(v)).sum();
        sum / self.lat.len() as f64
    }

    /// Effective thickness `DRF[k] * hFacC[k, i]`.
    pub fn effective_thickness(&self) -> Result<MaskedThickness, GridError> {
        Ok(self.vertical.masked_thickness(&self.hfacc)?)
    }
}
