//! Model time-axis codec
//!
//! The GFS time axis stores fractional days counted from an epoch one day
//! before 0001-01-01, so integer day 1 decodes to the proleptic-Gregorian
//! date 0001-01-01. Conversions clamp nothing: an axis value that cannot be
//! represented is a domain error, not a skipped record.

use crate::errors::{Result, WindTileError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};

/// Decodes one raw time-axis value into a UTC instant.
pub fn axis_value_to_datetime(value: f64) -> Result<DateTime<Utc>> {
    if !value.is_finite() {
        return Err(WindTileError::Domain {
            message: format!("time axis value {} is not finite", value),
        });
    }

    let integer_day = value.trunc();
    let fractional_day = value - integer_day;

    let ordinal = integer_day as i32 - 1;
    let date = NaiveDate::from_num_days_from_ce_opt(ordinal).ok_or_else(|| {
        WindTileError::Domain {
            message: format!("time axis value {} has no calendar date", value),
        }
    })?;

    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| WindTileError::Domain {
        message: format!("time axis value {} has no midnight instant", value),
    })?;

    let seconds = (fractional_day * 86_400.0).round() as i64;
    Ok(Utc.from_utc_datetime(&midnight) + Duration::seconds(seconds))
}

/// Encodes a UTC instant back into a raw time-axis value.
///
/// Inverse of [`axis_value_to_datetime`] to within the axis resolution;
/// used when building synthetic datasets.
pub fn datetime_to_axis_value(instant: DateTime<Utc>) -> f64 {
    let integer_day = (instant.date_naive().num_days_from_ce() + 1) as f64;
    let seconds = instant.time().num_seconds_from_midnight() as f64;

    integer_day + seconds / 86_400.0
}

/// POSIX timestamp of a UTC instant, as written into tile headers.
pub fn datetime_to_posix(instant: DateTime<Utc>) -> i64 {
    instant.timestamp()
}

/// UTC instant for a POSIX timestamp.
pub fn posix_to_datetime(timestamp: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| WindTileError::Domain {
            message: format!("POSIX timestamp {} is not representable", timestamp),
        })
}
