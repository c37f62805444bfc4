//! Hydrostatic pressure from depth.
//!
//! Uses the Saunders (1981) closed form, which is the starting estimate of
//! the TEOS-10 `p_from_z` iteration and agrees with it to well under 1 dbar
//! over the full ocean depth.
//!
//! Saunders, P. M. (1981): Practical conversion of pressure to depth.
//! J. Phys. Oceanogr. 11, 573-574.

/// Pressure (dbar) at height `z` (m, negative below the sea surface) and
/// latitude `lat` (degrees).
///
/// Heights above the surface are clamped to zero pressure.
///
/// # Example
/// ```
/// use llc_steric::equations::pressure_from_depth;
///
/// let p = pressure_from_depth(-1000.0, 30.0);
/// assert!((p - 1009.55).abs() < 0.01);
/// ```
pub fn pressure_from_depth(z: f64, lat: f64) -> f64 {
    let depth = (-z).max(0.0);
    let x = lat.to_radians().sin().powi(2);
    let c1 = 5.92e-3 + 5.25e-3 * x;
    let a = 1.0 - c1;
    (a - (a * a - 8.84e-6 * depth).sqrt()) / 4.42e-6
}

/// Pressure at each vertical cell center.
///
/// MITgcm stores `RC` as negative heights; positive-valued profiles are
/// treated as depths, so both conventions give non-negative pressure.
pub fn pressure_profile(rc: &[f32], lat: f64) -> Vec<f64> {
    rc.iter()
        .map(|&z| pressure_from_depth(-f64::from(z).abs(), lat))
        .collect()
}
