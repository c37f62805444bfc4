//! Regular time axis for a sequence of model snapshots.

use chrono::{Duration, NaiveDateTime};

use super::TimeFormatError;

/// Ordered, evenly spaced snapshot times.
///
/// Built with integer-second arithmetic from the start time, so the n-th
/// entry is exactly `tini + n * dt` with no accumulated drift.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeSeries {
    times: Vec<NaiveDateTime>,
    dt_seconds: i64,
}

impl TimeSeries {
    /// Build the inclusive series `tini, tini + dt, ..., <= tend`.
    ///
    /// The result has `floor((tend - tini) / dt) + 1` entries.
    ///
    /// # Errors
    /// `TimeFormatError::Range` if `dt` is not a positive whole number of
    /// seconds or if `tend` precedes `tini`.
    pub fn regular(
        tini: NaiveDateTime,
        tend: NaiveDateTime,
        dt: Duration,
    ) -> Result<Self, TimeFormatError> {
        let dt_seconds = dt.num_seconds();
        if dt_seconds <= 0 || dt.subsec_nanos() != 0 {
            return Err(TimeFormatError::Range(format!(
                "sampling interval must be a positive whole number of seconds, got {dt}"
            )));
        }

        let span = (tend - tini).num_seconds();
        if span < 0 {
            return Err(TimeFormatError::Range(format!(
                "end time {tend} precedes start time {tini}"
            )));
        }

        let n = span / dt_seconds + 1;
        let times = (0..n)
            .map(|i| tini + Duration::seconds(i * dt_seconds))
            .collect();

        Ok(Self { times, dt_seconds })
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True if the series holds no timestamps.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sampling interval in seconds.
    pub fn dt_seconds(&self) -> i64 {
        self.dt_seconds
    }

    /// First timestamp.
    pub fn first(&self) -> Option<&NaiveDateTime> {
        self.times.first()
    }

    /// Last timestamp.
    pub fn last(&self) -> Option<&NaiveDateTime> {
        self.times.last()
    }

    /// Timestamp at `index`.
    pub fn get(&self, index: usize) -> Option<&NaiveDateTime> {
        self.times.get(index)
    }

    /// Access the underlying timestamps.
    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Iterate over timestamps in order.
    pub fn iter(&self) -> std::slice::Iter<'_, NaiveDateTime> {
        self.times.iter()
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a NaiveDateTime;
    type IntoIter = std::slice::Iter<'a, NaiveDateTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.times.iter()
    }
}
