//! Conversions between epoch seconds and broken-down UTC times

use chrono::{DateTime, NaiveDateTime};

/// Value used for a record whose time is unknown
pub const TIME_D_UNKNOWN: f64 = -2_209_075_200.0;

/// Converts epoch seconds (since 1970-01-01T00:00:00) to a broken-down UTC time
///
/// Returns [`None`] for times chrono cannot represent.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_datetime(time_d: f64) -> Option<NaiveDateTime> {
    if !time_d.is_finite() {
        return None;
    }
    let secs = time_d.floor();
    let nanos = ((time_d - secs) * 1.0e9).round().clamp(0.0, 999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos).map(|dt| dt.naive_utc())
}

/// Converts a UTC time to epoch seconds
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_datetime(time: NaiveDateTime) -> f64 {
    let utc = time.and_utc();
    utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_micros()) * 1.0e-6
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn datetime_round_trip() {
        let t = NaiveDate::from_ymd_opt(2000, 6, 15)
            .and_then(|d| d.and_hms_micro_opt(12, 30, 15, 250_000))
            .unwrap();
        let time_d = from_datetime(t);
        assert!((time_d - 961_072_215.25).abs() < 1e-6);
        assert_eq!(to_datetime(time_d), Some(t));
    }

    #[test]
    fn unknown_time_is_before_1900() {
        let t = to_datetime(TIME_D_UNKNOWN).unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(1899, 12, 31).unwrap());
    }
}
