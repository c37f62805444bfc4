//! Catalog of regional grid dimensions.
//!
//! Every region directory carries an open-cell fraction file whose name
//! encodes the region's extents, `grid/hFacC_{Nx}x{Ny}x{Nz}`. Scanning a tree
//! of regions for those files yields a small CSV table:
//!
//! ```text
//! region,Nx,Ny,Nz
//! CalSWOT,960,1754,88
//! TropicalPacific,1080,720,88
//! ```
//!
//! A region whose file name does not follow the pattern is reported and
//! skipped; the rest of the scan continues.

use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

/// Pattern of the open-cell fraction file name.
static HFACC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^hFacC_(\d+)x(\d+)x(\d+)(?:\.data)?$").expect("Invalid hFacC file name pattern")
});

/// CSV header line.
pub const CATALOG_HEADER: &str = "region,Nx,Ny,Nz";

/// Error type for catalog scans. Per-region problems are [`CatalogSkip`]s.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Output or traversal I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Root path produced an invalid glob pattern
    #[error("invalid scan pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Parse `hFacC_{Nx}x{Ny}x{Nz}` into `(Nx, Ny, Nz)`.
///
/// # Example
/// ```
/// use llc_steric::catalog::parse_hfacc_name;
///
/// assert_eq!(parse_hfacc_name("hFacC_960x1754x88"), Some((960, 1754, 88)));
/// assert_eq!(parse_hfacc_name("hFacC_960x1754"), None);
/// ```
pub fn parse_hfacc_name(name: &str) -> Option<(usize, usize, usize)> {
    let caps = HFACC_RE.captures(name)?;
    let nx = caps[1].parse().ok()?;
    let ny = caps[2].parse().ok()?;
    let nz = caps[3].parse().ok()?;
    Some((nx, ny, nz))
}

/// One catalogued region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Region name (directory above `grid/`, relative to the scan root)
    pub region: String,
    /// Number of longitude points
    pub nx: usize,
    /// Number of latitude points
    pub ny: usize,
    /// Number of vertical levels
    pub nz: usize,
    /// The hFacC file the entry was read from
    pub path: PathBuf,
}

impl CatalogEntry {
    /// CSV row without trailing newline.
    pub fn csv_row(&self) -> String {
        format!("{},{},{},{}", self.region, self.nx, self.ny, self.nz)
    }
}

/// A grid file that could not be catalogued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogSkip {
    /// Region name, or the raw path when no region could be derived
    pub region: String,
    /// Offending file
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: String,
}

/// Result of scanning a directory tree.
#[derive(Clone, Debug, Default)]
pub struct CatalogScan {
    /// Catalogued regions, sorted by name
    pub entries: Vec<CatalogEntry>,
    /// Files that were skipped
    pub skipped: Vec<CatalogSkip>,
}

impl CatalogScan {
    /// Write the entries as CSV (header included).
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write_catalog_csv(&self.entries, writer)
    }
}

/// `path` without `.` components; glob drops a leading `./` from its hits.
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Region name of `grid_file` = path components between `root` and `grid/`.
fn region_name(root: &Path, grid_file: &Path) -> Option<String> {
    let grid_dir = grid_file.parent()?;
    if grid_dir.file_name()? != "grid" {
        return None;
    }
    let region_dir = without_cur_dir(grid_dir.parent()?);
    let relative = region_dir.strip_prefix(without_cur_dir(root)).ok()?;

    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Find every `**/grid/hFacC*` below `root` and parse its dimensions.
pub fn scan_regions(root: &Path) -> Result<CatalogScan, CatalogError> {
    let escaped = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{escaped}/**/grid/hFacC*");

    let mut scan = CatalogScan::default();
    for item in glob::glob(&pattern)? {
        let path = match item {
            Ok(path) => path,
            Err(e) => {
                warn!(path = %e.path().display(), error = %e.error(), "unreadable entry during scan");
                scan.skipped.push(CatalogSkip {
                    region: e.path().display().to_string(),
                    path: e.path().to_path_buf(),
                    reason: e.error().to_string(),
                });
                continue;
            }
        };

        let Some(region) = region_name(root, &path) else {
            let skip = CatalogSkip {
                region: path.display().to_string(),
                path,
                reason: "grid directory has no enclosing region directory".to_string(),
            };
            warn!(region = %skip.region, "{}", skip.reason);
            scan.skipped.push(skip);
            continue;
        };

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        match parse_hfacc_name(name) {
            Some((nx, ny, nz)) => {
                info!(%region, nx, ny, nz, "catalogued region");
                scan.entries.push(CatalogEntry {
                    region,
                    nx,
                    ny,
                    nz,
                    path,
                });
            }
            None => {
                warn!(%region, file = name, "skipping region with malformed hFacC file name");
                scan.skipped.push(CatalogSkip {
                    reason: format!("{name} does not match hFacC_{{Nx}}x{{Ny}}x{{Nz}}"),
                    region,
                    path,
                });
            }
        }
    }

    scan.entries.sort_by(|a, b| a.region.cmp(&b.region));
    Ok(scan)
}

/// Write `region,Nx,Ny,Nz` CSV.
pub fn write_catalog_csv<W: Write>(entries: &[CatalogEntry], writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "{CATALOG_HEADER}")?;
    for entry in entries {
        writeln!(writer, "{}", entry.csv_row())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_parse_hfacc_name() {
        assert_eq!(parse_hfacc_name("hFacC_100x200x50"), Some((100, 200, 50)));
        assert_eq!(parse_hfacc_name("hFacC_100x200x50.data"), Some((100, 200, 50)));
        assert_eq!(parse_hfacc_name("hFacC_100x200"), None);
        assert_eq!(parse_hfacc_name("hFacC_axbxc"), None);
        assert_eq!(parse_hfacc_name("hFacW_100x200x50"), None);
    }

    #[test]
    fn test_scan_emits_rows() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("regions");
        touch(&root, "Foo/grid/hFacC_100x200x50");
        touch(&root, "Bar/grid/hFacC_10x20x5");
        touch(&root, "Bar/grid/XC_10x20");

        let scan = scan_regions(&root).unwrap();
        assert!(scan.skipped.is_empty());
        let rows: Vec<String> = scan.entries.iter().map(CatalogEntry::csv_row).collect();
        assert_eq!(rows, vec!["Bar,10,20,5", "Foo,100,200,50"]);
    }

    #[test]
    fn test_malformed_region_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "Good/grid/hFacC_4x3x2");
        touch(root, "Broken/grid/hFacC_4x3");
        touch(root, "Zulu/grid/hFacC_8x6x4");

        let scan = scan_regions(root).unwrap();
        assert_eq!(scan.entries.len(), 2);
        assert_eq!(scan.entries[0].region, "Good");
        assert_eq!(scan.entries[1].region, "Zulu");
        assert_eq!(scan.skipped.len(), 1);
        assert_eq!(scan.skipped[0].region, "Broken");
    }

    #[test]
    fn test_csv_output() {
        let entries = vec![CatalogEntry {
            region: "Foo".to_string(),
            nx: 100,
            ny: 200,
            nz: 50,
            path: PathBuf::from("Foo/grid/hFacC_100x200x50"),
        }];
        let mut out = Vec::new();
        write_catalog_csv(&entries, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "region,Nx,Ny,Nz\nFoo,100,200,50\n");
    }

    #[test]
    fn test_nested_region_name() {
        let root = Path::new("/data/regions");
        let file = Path::new("/data/regions/Pacific/Kuroshio/grid/hFacC_1x1x1");
        assert_eq!(region_name(root, file).as_deref(), Some("Pacific/Kuroshio"));
        assert_eq!(region_name(root, Path::new("/data/regions/grid/hFacC_1x1x1")), None);
    }

    #[test]
    fn test_relative_root_matches_glob_hits() {
        // glob yields `Foo/grid/...` for the pattern `./**/grid/hFacC*`
        let hit = Path::new("Foo/grid/hFacC_100x200x50");
        assert_eq!(region_name(Path::new("."), hit).as_deref(), Some("Foo"));
        assert_eq!(region_name(Path::new("./"), hit).as_deref(), Some("Foo"));
        assert_eq!(
            region_name(Path::new("./regions"), Path::new("regions/Foo/grid/hFacC_1x1x1")).as_deref(),
            Some("Foo")
        );
        assert_eq!(region_name(Path::new("."), Path::new("grid/hFacC_1x1x1")), None);
    }

    #[test]
    fn test_scan_with_dot_segment_in_root() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "regions/Foo/grid/hFacC_100x200x50");

        let root = dir.path().join(".").join("regions");
        let scan = scan_regions(&root).unwrap();
        assert!(scan.skipped.is_empty());
        assert_eq!(scan.entries[0].csv_row(), "Foo,100,200,50");
    }
}
