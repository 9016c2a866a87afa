//! Slice fetching and cross-variable shape validation
//!
//! One ranged request per physical variable, issued in a fixed order
//! (height, then u-wind, then v-wind), each covering the selected time
//! interval, every pressure level, the selected latitude run and the full
//! longitude axis. The three results must agree on shape before anything is
//! serialized.

use crate::data_source::GridDataset;
use crate::errors::{Result, WindTileError};
use crate::time::axis_value_to_datetime;
use crate::window::{TimeWindow, Window};
use chrono::{DateTime, Utc};
use log::{debug, info};
use ndarray::ArrayD;

/// Model variable names, in fetch order.
pub const HEIGHT: &str = "hgtprs";
pub const WIND_U: &str = "ugrdprs";
pub const WIND_V: &str = "vgrdprs";

/// One physical field over (time, pressure, lat, lon), with the physical
/// coordinate of every index along each dimension.
pub struct GriddedVariable {
    pub name: String,
    pub values: ArrayD<f32>,
    pub times: Vec<DateTime<Utc>>,
    pub pressures: Vec<f64>,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
}

impl GriddedVariable {
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }
}

/// The three fetched variables, shape-validated on construction.
pub struct WindDataSet {
    pub height: GriddedVariable,
    pub wind_u: GriddedVariable,
    pub wind_v: GriddedVariable,
}

impl WindDataSet {
    /// Builds the set, rejecting any cross-variable shape divergence.
    pub fn new(
        height: GriddedVariable,
        wind_u: GriddedVariable,
        wind_v: GriddedVariable,
    ) -> Result<Self> {
        let expected = height.shape().to_vec();
        for var in [&wind_u, &wind_v] {
            if var.shape() != expected.as_slice() {
                return Err(WindTileError::ShapeMismatch {
                    variable: var.name.clone(),
                    expected: expected.clone(),
                    actual: var.shape().to_vec(),
                });
            }
        }

        Ok(Self {
            height,
            wind_u,
            wind_v,
        })
    }
}

/// Fetches height, u-wind and v-wind for the selected window.
pub fn fetch_wind_data(
    dataset: &dyn GridDataset,
    time_window: &TimeWindow,
    window: &Window,
) -> Result<WindDataSet> {
    let time_axis = dataset.time_axis()?;
    let pressures = dataset.pressure_axis()?;
    let lat_axis = dataset.latitude_axis()?;
    let longitudes = dataset.longitude_axis()?;

    let lat_indices = window.latitude_indices(&lat_axis);
    let lat_run = contiguous_run(&lat_indices)?;
    let latitudes: Vec<f64> = lat_indices.iter().map(|&i| lat_axis[i]).collect();

    let times: Vec<DateTime<Utc>> = time_axis[time_window.start..=time_window.end]
        .iter()
        .map(|&value| axis_value_to_datetime(value))
        .collect::<Result<_>>()?;

    let fetch_one = |name: &str| -> Result<GriddedVariable> {
        info!("fetching variable '{}'", name);
        let values = fetch_variable(
            dataset,
            name,
            time_window,
            &lat_run,
            pressures.len(),
            longitudes.len(),
        )?;
        debug!("variable '{}' has shape {:?}", name, values.shape());

        Ok(GriddedVariable {
            name: name.to_string(),
            values,
            times: times.clone(),
            pressures: pressures.clone(),
            latitudes: latitudes.clone(),
            longitudes: longitudes.clone(),
        })
    };

    // Fixed fetch order: height, then u-wind, then v-wind.
    let height = fetch_one(HEIGHT)?;
    let wind_u = fetch_one(WIND_U)?;
    let wind_v = fetch_one(WIND_V)?;
    WindDataSet::new(height, wind_u, wind_v)
}

/// Fetches one variable, or builds the degenerate empty slice when the
/// latitude window selected no axis values at all.
fn fetch_variable(
    dataset: &dyn GridDataset,
    name: &str,
    time_window: &TimeWindow,
    lat_run: &Option<std::ops::Range<usize>>,
    n_pressures: usize,
    n_longitudes: usize,
) -> Result<ArrayD<f32>> {
    let times = time_window.start..time_window.end + 1;

    let values = match lat_run {
        Some(lats) => dataset.fetch_slice(name, times, lats.clone())?,
        // An empty latitude window is valid but degenerate; there is nothing
        // to request, so the slice is built locally with a zero-length
        // latitude dimension.
        None => ArrayD::from_shape_vec(
            vec![time_window.steps(), n_pressures, 0, n_longitudes],
            Vec::new(),
        )?,
    };

    if values.ndim() != 4 {
        return Err(WindTileError::InsufficientData {
            variable: name.to_string(),
            message: format!("slice has {} dimensions, expected 4", values.ndim()),
        });
    }
    if values.shape()[0] < 1 {
        return Err(WindTileError::InsufficientData {
            variable: name.to_string(),
            message: "window selects fewer than one time step".to_string(),
        });
    }

    Ok(values)
}

/// Converts an ordered index list into its contiguous range.
///
/// A threshold filter over a monotonic axis always yields a contiguous run;
/// a gap means the axis itself is unordered.
fn contiguous_run(indices: &[usize]) -> Result<Option<std::ops::Range<usize>>> {
    let (first, last) = match (indices.first(), indices.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Ok(None),
    };

    if last - first + 1 != indices.len() {
        return Err(WindTileError::InvalidSlice {
            message: format!(
                "latitude indices {:?} are not a contiguous run; axis is not monotonic",
                indices
            ),
        });
    }

    Ok(Some(first..last + 1))
}
