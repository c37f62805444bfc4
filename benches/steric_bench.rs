//! Benchmarks for steric height integration.
//!
//! Run with: `cargo bench --bench steric_bench`
//!
//! Compares the pure anomaly kernel with the full per-point JMD95 profile for
//! region-sized columns.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use llc_steric::region::{RegionDims, RegionGrid};
use llc_steric::steric::{StericConfig, StericHeightCalculator, integrate_anomaly};
use llc_steric::vertical::ZLevelGrid;

const NZ: usize = 88;

/// Synthetic square region with `n x n` columns and a sloping bottom.
fn synthetic_grid(n: usize) -> RegionGrid {
    let n_columns = n * n;
    let drf: Vec<f32> = (0..NZ).map(|k| 1.0 + k as f32).collect();
    let mut rc = Vec::with_capacity(NZ);
    let mut z = 0.0f32;
    for &dz in &drf {
        rc.push(-(z + 0.5 * dz));
        z += dz;
    }

    let hfacc: Vec<f32> = (0..NZ)
        .flat_map(|k| (0..n_columns).map(move |i| if k < NZ - i % 20 { 1.0 } else { 0.0 }))
        .collect();
    let lon: Vec<f32> = (0..n_columns).map(|i| (i % n) as f32 * 0.02).collect();
    let lat: Vec<f32> = (0..n_columns).map(|i| 30.0 + (i / n) as f32 * 0.02).collect();

    RegionGrid::from_parts(
        RegionDims::new(n, n, NZ),
        lon,
        lat,
        ZLevelGrid::new(rc, drf).unwrap(),
        hfacc,
    )
    .unwrap()
}

/// Temperature and salinity with a simple thermocline.
fn synthetic_fields(n_columns: usize) -> (Vec<f32>, Vec<f32>) {
    let mut theta = Vec::with_capacity(NZ * n_columns);
    let mut salt = Vec::with_capacity(NZ * n_columns);
    for k in 0..NZ {
        let t = 2.0 + 20.0 * (-(k as f32) / 15.0).exp();
        for i in 0..n_columns {
            theta.push(t + 0.001 * (i % 7) as f32);
            salt.push(34.5 + 0.01 * (k % 5) as f32);
        }
    }
    (theta, salt)
}

fn bench_integrate_anomaly(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate_anomaly");
    for &n in &[16usize, 64] {
        let grid = synthetic_grid(n);
        let dz = grid.effective_thickness().unwrap();
        let anomaly: Vec<f32> = (0..NZ * n * n).map(|i| -1e-3 + 1e-7 * (i % 97) as f32).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n * n), &anomaly, |b, anomaly| {
            b.iter(|| integrate_anomaly(black_box(anomaly), black_box(&dz)).unwrap())
        });
    }
    group.finish();
}

fn bench_jmd95_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("jmd95_profile");
    for &n in &[16usize, 64] {
        let grid = synthetic_grid(n);
        let calc = StericHeightCalculator::new(&grid, &StericConfig::default()).unwrap();
        let (theta, salt) = synthetic_fields(n * n);
        group.bench_function(BenchmarkId::from_parameter(n * n), |b| {
            b.iter(|| calc.profile(black_box(&theta), black_box(&salt)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_integrate_anomaly, bench_jmd95_profile);
criterion_main!(benches);
