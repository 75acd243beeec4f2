use bon::Builder;
use chrono::NaiveDateTime;

use crate::{time::from_datetime, Error};

/// Parameters controlling which records a reading session passes on
///
/// ```
/// use libmbio::session::ControlParams;
///
/// let params = ControlParams::builder()
///     .bounds([-122.0, -121.0, 36.0, 37.0])
///     .speedmin(0.5)
///     .build();
/// assert!(params.validate().is_ok());
/// assert_eq!(params.pings, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
#[non_exhaustive]
pub struct ControlParams {
    /// Longitude range: `-1` for [-360, 0], `0` for [-180, 180], `1` for [0, 360]
    #[builder(default)]
    pub lonflip: i8,
    /// Geographic bounds as `[west, east, south, north]` in degrees
    #[builder(default = [-360.0, 360.0, -90.0, 90.0])]
    pub bounds: [f64; 4],
    /// Start of the time window in epoch seconds
    ///
    /// When `etime` precedes `btime` the window is inverted and excludes
    /// the times between them.
    #[builder(default = f64::NEG_INFINITY)]
    pub btime: f64,
    /// End of the time window in epoch seconds
    #[builder(default = f64::INFINITY)]
    pub etime: f64,
    /// Minimum speed in km/hr
    #[builder(default)]
    pub speedmin: f64,
    /// Largest gap between pings in minutes before a time gap is reported
    #[builder(default = 1.0)]
    pub timegap: f64,
    /// Number of pings averaged by [`Session::read`](super::Session::read)
    #[builder(default = 1)]
    pub pings: usize,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ControlParams {
    /// Sets the time window from two UTC times
    #[must_use]
    pub fn with_time_window(mut self, begin: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.btime = from_datetime(begin);
        self.etime = from_datetime(end);
        self
    }

    /// Checks the parameters for consistency
    ///
    /// # Errors
    ///
    /// [`Error::BadParameter`] naming the first inconsistent value
    pub fn validate(&self) -> Result<(), Error> {
        let [west, east, south, north] = self.bounds;
        if self.pings < 1 {
            return Err(Error::BadParameter("pings must be at least 1".to_owned()));
        }
        if !(west <= east) {
            return Err(Error::BadParameter(format!(
                "western bound {west} lies east of eastern bound {east}"
            )));
        }
        if !(south <= north) {
            return Err(Error::BadParameter(format!(
                "southern bound {south} lies north of northern bound {north}"
            )));
        }
        if !(self.speedmin >= 0.0) {
            return Err(Error::BadParameter(format!(
                "minimum speed {} must not be negative",
                self.speedmin
            )));
        }
        if !(self.timegap >= 0.0) {
            return Err(Error::BadParameter(format!(
                "time gap {} must not be negative",
                self.timegap
            )));
        }
        if self.btime.is_nan() || self.etime.is_nan() {
            return Err(Error::BadParameter("time window is not a number".to_owned()));
        }
        Ok(())
    }

    /// Returns `true` if `lon`, `lat` lie within the bounds
    #[must_use]
    pub fn in_bounds(&self, lon: f64, lat: f64) -> bool {
        let [west, east, south, north] = self.bounds;
        !(lon < west || lon > east || lat < south || lat > north)
    }

    /// Returns `true` if `time_d` lies within the time window
    #[must_use]
    pub fn in_time_window(&self, time_d: f64) -> bool {
        if self.etime > self.btime {
            !(time_d > self.etime || time_d < self.btime)
        } else if self.etime < self.btime {
            !(time_d > self.etime && time_d < self.btime)
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_accept_everything() {
        let params = ControlParams::default();
        assert!(params.validate().is_ok());
        assert!(params.in_bounds(-359.0, 89.0));
        assert!(params.in_time_window(-1.0e12));
        assert!(params.in_time_window(1.0e12));
    }

    #[test]
    fn inverted_window_excludes_the_middle() {
        let params = ControlParams::builder().btime(200.0).etime(100.0).build();
        assert!(params.in_time_window(50.0));
        assert!(params.in_time_window(250.0));
        assert!(!params.in_time_window(150.0));
    }

    #[test]
    fn inconsistent_parameters_are_rejected() {
        for params in [
            ControlParams::builder().pings(0).build(),
            ControlParams::builder().bounds([10.0, 0.0, -90.0, 90.0]).build(),
            ControlParams::builder().speedmin(-1.0).build(),
            ControlParams::builder().timegap(f64::NAN).build(),
        ] {
            assert!(matches!(params.validate(), Err(Error::BadParameter(_))));
        }
    }
}
