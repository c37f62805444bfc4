//! Integration tests for the grid catalog and dimension inference.

use std::fs;
use std::path::Path;

use llc_steric::catalog::{CATALOG_HEADER, scan_regions};
use llc_steric::io::write_be_f32;
use llc_steric::region::{GridSource, LlcRegion, RegionDims, RegionGrid};
use tempfile::tempdir;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

#[test]
fn test_catalog_csv_for_region_tree() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("regions");
    touch(&root, "Foo/grid/hFacC_100x200x50");
    touch(&root, "CalSWOT/grid/hFacC_960x1754x88");
    touch(&root, "CalSWOT/Theta/Theta_20110913T000000");
    touch(&root, "Empty/grid/XC_10x10");

    let scan = scan_regions(&root).unwrap();
    let mut csv = Vec::new();
    scan.write_csv(&mut csv).unwrap();

    let text = String::from_utf8(csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec![CATALOG_HEADER, "CalSWOT,960,1754,88", "Foo,100,200,50"]);
}

#[test]
fn test_malformed_region_does_not_stop_scan() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "A/grid/hFacC_1x2x3");
    touch(dir.path(), "B/grid/hFacC_bogus");
    touch(dir.path(), "C/grid/hFacC_4x5x6");

    let scan = scan_regions(dir.path()).unwrap();
    let regions: Vec<&str> = scan.entries.iter().map(|e| e.region.as_str()).collect();
    assert_eq!(regions, vec!["A", "C"]);
    assert_eq!(scan.skipped.len(), 1);
    assert!(scan.skipped[0].reason.contains("hFacC_bogus"));
}

#[test]
fn test_empty_tree() {
    let dir = tempdir().unwrap();
    let scan = scan_regions(dir.path()).unwrap();
    assert!(scan.entries.is_empty());
    assert!(scan.skipped.is_empty());
}

#[test]
fn test_catalogued_dims_load_region() {
    let dir = tempdir().unwrap();
    let grid = dir.path().join("Tiny/grid");
    fs::create_dir_all(&grid).unwrap();
    write_be_f32(&grid.join("XC_2x1"), &[0.0, 1.0]).unwrap();
    write_be_f32(&grid.join("YC_2x1"), &[-10.0, -12.0]).unwrap();
    write_be_f32(&grid.join("hFacC_2x1x1"), &[1.0, 0.0]).unwrap();
    write_be_f32(&grid.join("RC.data"), &[-5.0]).unwrap();
    write_be_f32(&grid.join("DRF.data"), &[10.0]).unwrap();

    let entry = &scan_regions(dir.path()).unwrap().entries[0];
    assert_eq!(entry.region, "Tiny");

    let dims = RegionDims::from_grid_dir(&grid).unwrap();
    assert_eq!(dims, RegionDims::new(entry.nx, entry.ny, entry.nz));

    let loaded = RegionGrid::load(&GridSource::new(&grid), dims).unwrap();
    assert_eq!(loaded.effective_thickness().unwrap().level(0), &[10.0, 0.0]);

    let mut region = LlcRegion::new(&grid, dir.path(), dims.nlon, dims.nlat, dims.nz);
    assert_eq!(region.load_grid().unwrap().lat(), &[-10.0, -12.0]);
}

#[test]
fn test_scan_from_current_directory() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "Foo/grid/hFacC_100x200x50");

    // Every other test here uses absolute paths, so changing the working
    // directory does not disturb them.
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let scan = scan_regions(Path::new("."));
    std::env::set_current_dir(previous).unwrap();

    let scan = scan.unwrap();
    assert!(scan.skipped.is_empty());
    let rows: Vec<String> = scan.entries.iter().map(|e| e.csv_row()).collect();
    assert_eq!(rows, vec!["Foo,100,200,50"]);
}
