//! Snapshot timestamps and regular time axes.
//!
//! LLC4320 output files are stamped with a compact `YYYYMMDDTHHMMSS` string
//! (e.g. `20121009T180000` for 9 Oct 2012, 18:00:00). This module parses and
//! renders that layout and builds the evenly spaced time axis that pairs with
//! a list of snapshot files.

mod series;
mod timestamp;

pub use series::TimeSeries;
pub use timestamp::{COMPACT_LEN, TimeFormatError, format_time, parse_time};
