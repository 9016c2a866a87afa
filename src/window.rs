//! Spatial and temporal window selection against dataset axes
//!
//! A [`Window`] maps the caller's center/half-width query onto concrete axis
//! indices; a [`TimeRange`] maps onto a contiguous run of time indices. Both
//! are computed once per run and are immutable afterwards.

use crate::coords::{angular_distance, canonicalize_longitude};
use crate::errors::{Result, WindTileError};
use crate::time::axis_value_to_datetime;
use chrono::{DateTime, Utc};

/// A spatial query: window center plus half-widths in degrees.
///
/// The center longitude is canonicalized to [0, 360) on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub center_lat: f64,
    pub lat_delta: f64,
    pub center_lon: f64,
    pub lon_delta: f64,
}

impl Window {
    pub fn new(center_lat: f64, lat_delta: f64, center_lon: f64, lon_delta: f64) -> Result<Self> {
        if !center_lat.is_finite() || !lat_delta.is_finite() || !lon_delta.is_finite() {
            return Err(WindTileError::Domain {
                message: "window parameters must be finite".to_string(),
            });
        }
        if lat_delta < 0.0 || lon_delta < 0.0 {
            return Err(WindTileError::Domain {
                message: format!(
                    "window half-widths must be non-negative, got lat {} lon {}",
                    lat_delta, lon_delta
                ),
            });
        }

        Ok(Self {
            center_lat,
            lat_delta,
            center_lon: canonicalize_longitude(center_lon)?,
            lon_delta,
        })
    }

    /// Indices of latitude axis values within `lat_delta` of the center,
    /// in original axis order.
    pub fn latitude_indices(&self, lat_axis: &[f64]) -> Vec<usize> {
        lat_axis
            .iter()
            .enumerate()
            .filter(|(_, &value)| (value - self.center_lat).abs() <= self.lat_delta)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Indices of longitude axis values within circular distance `lon_delta`
    /// of the center, in original axis order.
    ///
    /// The source can only slice a contiguous longitude range cheaply, and a
    /// window straddling the 0/360 seam would need two disjoint ranges, so
    /// callers fetch the whole axis and filter with this method afterwards.
    /// The count selected depends only on the window and grid resolution,
    /// never on the time step.
    pub fn longitude_indices(&self, lon_axis: &[f64]) -> Vec<usize> {
        lon_axis
            .iter()
            .enumerate()
            .filter(|(_, &value)| angular_distance(value, self.center_lon) <= self.lon_delta)
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// A temporal query: closed range of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(min: DateTime<Utc>, max: DateTime<Utc>) -> Result<Self> {
        if min > max {
            return Err(WindTileError::Domain {
                message: format!("time range minimum {} is after maximum {}", min, max),
            });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.min && instant <= self.max
    }
}

/// The contiguous run of time-axis indices selected for a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    /// First selected index, inclusive.
    pub start: usize,
    /// Last selected index, inclusive.
    pub end: usize,
    /// Decoded instant at `start`, for caller diagnostics.
    pub first_instant: DateTime<Utc>,
    /// Decoded instant at `end`, for caller diagnostics.
    pub last_instant: DateTime<Utc>,
}

impl TimeWindow {
    /// Number of time steps selected, always at least one.
    pub fn steps(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Locates the first and last time-axis index whose decoded instant falls in
/// `range`, over an axis of ascending raw values.
pub fn select_time_window(time_axis: &[f64], range: &TimeRange) -> Result<TimeWindow> {
    let mut first: Option<(usize, DateTime<Utc>)> = None;
    let mut last: Option<(usize, DateTime<Utc>)> = None;

    for (idx, &value) in time_axis.iter().enumerate() {
        let instant = axis_value_to_datetime(value)?;
        if range.contains(instant) {
            if first.is_none() {
                first = Some((idx, instant));
            }
            last = Some((idx, instant));
        }
    }

    match (first, last) {
        (Some((start, first_instant)), Some((end, last_instant))) => Ok(TimeWindow {
            start,
            end,
            first_instant,
            last_instant,
        }),
        _ => Err(WindTileError::EmptyWindow {
            min: range.min.to_rfc3339(),
            max: range.max.to_rfc3339(),
        }),
    }
}
