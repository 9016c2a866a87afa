//! Coordinate normalization for the longitude seam
//!
//! The model's longitude axis runs [0, 360), so a window centered near the
//! 0°/360° seam cannot be expressed as a single interval. All longitude
//! comparisons therefore go through canonical values and circular distance.

use crate::errors::{Result, WindTileError};

/// Reduces a longitude to its canonical value in [0, 360).
///
/// Accepts any finite input, including negative western-hemisphere values.
pub fn canonicalize_longitude(lon: f64) -> Result<f64> {
    if !lon.is_finite() {
        return Err(WindTileError::Domain {
            message: format!("longitude {} is not finite", lon),
        });
    }

    let mut canonical = lon % 360.0;
    if canonical < 0.0 {
        canonical += 360.0;
    }
    // -1e-10 % 360.0 is a negative zero; fold it onto plain zero
    Ok(canonical + 0.0)
}

/// Shortest circular distance between two angles in degrees.
///
/// Symmetric in its arguments and always in [0, 180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}
