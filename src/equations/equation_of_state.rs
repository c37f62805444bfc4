//! Equation of State for seawater density.
//!
//! Computes in-situ density ρ(S, θ, p) from salinity, potential temperature
//! and pressure using the Jackett & McDougall (1995) fit to EOS-80, the same
//! formulation MITgcm uses for its `JMD95Z`/`JMD95P` options. LLC4320 writes
//! potential temperature, so this is the natural companion to its output.
//!
//! # References
//!
//! - Jackett, D. R. & McDougall, T. J. (1995): Minimal adjustment of
//!   hydrographic profiles to achieve static stability. J. Atmos. Oceanic
//!   Technol. 12, 381-389.
//! - UNESCO (1981): Tenth report of the joint panel on oceanographic tables and standards.
//!
//! # Units
//!
//! - Potential temperature: °C
//! - Salinity: PSU (practical salinity units)
//! - Pressure: dbar (decibars), where 1 dbar ≈ 1 m depth
//! - Density: kg/m³

use thiserror::Error;

/// Reference density used to form the steric anomaly (kg/m³).
pub const RHO_0: f64 = 1027.5;

/// Error type for density evaluation.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EosError {
    /// Salinity below zero
    #[error("negative salinity {0} PSU")]
    NegativeSalinity(f64),

    /// Pressure below zero
    #[error("negative pressure {0} dbar")]
    NegativePressure(f64),

    /// NaN or infinite input
    #[error("non-finite input (S={salinity}, theta={theta}, p={pressure})")]
    NonFinite {
        salinity: f64,
        theta: f64,
        pressure: f64,
    },
}

/// Seawater density as a function of salinity, temperature and pressure.
///
/// Implementations must be pure: the same inputs always give the same
/// density, which keeps steric height output reproducible.
pub trait SeawaterDensity: Send + Sync {
    /// In-situ density (kg/m³) at pressure `pressure` (dbar).
    fn density(&self, salinity: f64, theta: f64, pressure: f64) -> Result<f64, EosError>;
}

fn check_inputs(salinity: f64, theta: f64, pressure: f64) -> Result<(), EosError> {
    if !(salinity.is_finite() && theta.is_finite() && pressure.is_finite()) {
        return Err(EosError::NonFinite {
            salinity,
            theta,
            pressure,
        });
    }
    if salinity < 0.0 {
        return Err(EosError::NegativeSalinity(salinity));
    }
    if pressure < 0.0 {
        return Err(EosError::NegativePressure(pressure));
    }
    Ok(())
}

// Fresh water density at p = 0
const FW: [f64; 6] = [
    999.842594,
    6.793952e-02,
    -9.095290e-03,
    1.001685e-04,
    -1.120083e-06,
    6.536332e-09,
];

// Sea water density at p = 0
const SW: [f64; 9] = [
    8.244930e-01,
    -4.089900e-03,
    7.643800e-05,
    -8.246700e-07,
    5.387500e-09,
    -5.724660e-03,
    1.022700e-04,
    -1.654600e-06,
    4.831400e-04,
];

// Secant bulk modulus of fresh water at p = 0
const KFW: [f64; 5] = [
    1.965933e+04,
    1.444304e+02,
    -1.706103e+00,
    9.648704e-03,
    -4.190253e-05,
];

// Secant bulk modulus of sea water at p = 0
const KSW: [f64; 7] = [
    5.284855e+01,
    -3.101089e-01,
    6.283263e-03,
    -5.084188e-05,
    3.886640e-01,
    9.085835e-03,
    -4.619924e-04,
];

// Pressure terms of the secant bulk modulus
const KP: [f64; 14] = [
    3.186519e+00,
    2.212276e-02,
    -2.984642e-04,
    1.956415e-06,
    6.704388e-03,
    -1.847318e-04,
    2.059331e-07,
    1.480266e-04,
    2.102898e-04,
    -1.202016e-05,
    1.394680e-07,
    -2.040237e-06,
    6.128773e-08,
    6.207323e-10,
];

/// Jackett & McDougall (1995) equation of state.
///
/// # Example
/// ```
/// use llc_steric::equations::{Jmd95, SeawaterDensity};
///
/// let rho = Jmd95.density(35.0, 25.0, 2000.0).unwrap();
/// assert!((rho - 1031.652).abs() < 1e-3);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Jmd95;

impl Jmd95 {
    /// Create the calculator.
    pub fn new() -> Self {
        Self
    }

    /// Density at surface pressure (p = 0), no validation.
    pub fn density_surface(&self, salinity: f64, theta: f64) -> f64 {
        let s = salinity;
        let t = theta;
        let t2 = t * t;
        let t3 = t2 * t;
        let t4 = t3 * t;
        let s3o2 = s * s.sqrt();

        let rho_w = FW[0] + FW[1] * t + FW[2] * t2 + FW[3] * t3 + FW[4] * t4 + FW[5] * t4 * t;

        rho_w
            + s * (SW[0] + SW[1] * t + SW[2] * t2 + SW[3] * t3 + SW[4] * t4)
            + s3o2 * (SW[5] + SW[6] * t + SW[7] * t2)
            + SW[8] * s * s
    }

    /// Secant bulk modulus K(S, θ, p) with `p_bar` in bar.
    pub fn secant_bulk_modulus(&self, salinity: f64, theta: f64, p_bar: f64) -> f64 {
        let s = salinity;
        let t = theta;
        let p = p_bar;
        let t2 = t * t;
        let t3 = t2 * t;
        let t4 = t3 * t;
        let s3o2 = s * s.sqrt();
        let p2 = p * p;

        let kw = KFW[0] + KFW[1] * t + KFW[2] * t2 + KFW[3] * t3 + KFW[4] * t4;

        let k0 = kw
            + s * (KSW[0] + KSW[1] * t + KSW[2] * t2 + KSW[3] * t3)
            + s3o2 * (KSW[4] + KSW[5] * t + KSW[6] * t2);

        k0 + p * (KP[0] + KP[1] * t + KP[2] * t2 + KP[3] * t3)
            + p * s * (KP[4] + KP[5] * t + KP[6] * t2)
            + p * s3o2 * KP[7]
            + p2 * (KP[8] + KP[9] * t + KP[10] * t2)
            + p2 * s * (KP[11] + KP[12] * t + KP[13] * t2)
    }
}

impl SeawaterDensity for Jmd95 {
    fn density(&self, salinity: f64, theta: f64, pressure: f64) -> Result<f64, EosError> {
        check_inputs(salinity, theta, pressure)?;
        let p_bar = 0.1 * pressure;
        let rho_surface = self.density_surface(salinity, theta);
        Ok(rho_surface / (1.0 - p_bar / self.secant_bulk_modulus(salinity, theta, p_bar)))
    }
}

/// Linear equation of state for synthetic fields and quick estimates.
///
/// ρ = ρ₀ * (1 - α(θ - θ₀) + β(S - S₀)), pressure ignored.
#[derive(Clone, Debug)]
pub struct LinearEquationOfState {
    /// Reference density (kg/m³)
    pub rho_0: f64,
    /// Reference temperature (°C)
    pub t_0: f64,
    /// Reference salinity (PSU)
    pub s_0: f64,
    /// Thermal expansion coefficient (1/°C)
    pub alpha: f64,
    /// Haline contraction coefficient (1/PSU)
    pub beta: f64,
}

impl Default for LinearEquationOfState {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearEquationOfState {
    /// Typical open-ocean coefficients about T₀ = 10°C, S₀ = 35 PSU.
    pub fn new() -> Self {
        Self {
            rho_0: RHO_0,
            t_0: 10.0,
            s_0: 35.0,
            alpha: 2.0e-4,
            beta: 7.6e-4,
        }
    }

    /// Create with custom reference state and coefficients.
    pub fn with_params(rho_0: f64, t_0: f64, s_0: f64, alpha: f64, beta: f64) -> Self {
        Self {
            rho_0,
            t_0,
            s_0,
            alpha,
            beta,
        }
    }
}

impl SeawaterDensity for LinearEquationOfState {
    fn density(&self, salinity: f64, theta: f64, pressure: f64) -> Result<f64, EosError> {
        check_inputs(salinity, theta, pressure)?;
        Ok(self.rho_0 * (1.0 - self.alpha * (theta - self.t_0) + self.beta * (salinity - self.s_0)))
    }
}
