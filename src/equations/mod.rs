//! Seawater equation of state and pressure conversion.
//!
//! Steric height needs in-situ density at every grid point. Density comes
//! from salinity, potential temperature and pressure; pressure in turn is
//! derived once per region from the vertical cell-center depths and a
//! reference latitude.

mod equation_of_state;
mod pressure;

pub use equation_of_state::{EosError, Jmd95, LinearEquationOfState, RHO_0, SeawaterDensity};
pub use pressure::{pressure_from_depth, pressure_profile};
