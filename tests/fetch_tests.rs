//! Slice fetching and shape validation tests against a scripted dataset.

use chrono::{Duration, TimeZone, Utc};
use ndarray::ArrayD;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use windtile::{
    data_source::GridDataset,
    errors::{Result, WindTileError},
    fetch::{fetch_wind_data, WindDataSet},
    time::datetime_to_axis_value,
    window::{select_time_window, TimeRange, Window},
};

/// In-memory dataset producing deterministic values; individual variables
/// can be scripted to return a wrong longitude count or dimensionality.
struct ScriptedDataset {
    time_axis: Vec<f64>,
    pressures: Vec<f64>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    lon_count_override: HashMap<String, usize>,
    flatten: HashMap<String, bool>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedDataset {
    fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2010, 3, 15, 0, 0, 0).unwrap();
        Self {
            time_axis: (0..24)
                .map(|h| datetime_to_axis_value(start + Duration::hours(h)))
                .collect(),
            pressures: vec![1000.0, 500.0],
            latitudes: vec![48.0, 50.0, 52.0, 54.0, 56.0],
            longitudes: vec![0.0, 0.5, 1.0, 358.5, 359.0, 359.5],
            lon_count_override: HashMap::new(),
            flatten: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl GridDataset for ScriptedDataset {
    fn time_axis(&self) -> Result<Vec<f64>> {
        Ok(self.time_axis.clone())
    }

    fn pressure_axis(&self) -> Result<Vec<f64>> {
        Ok(self.pressures.clone())
    }

    fn latitude_axis(&self) -> Result<Vec<f64>> {
        Ok(self.latitudes.clone())
    }

    fn longitude_axis(&self) -> Result<Vec<f64>> {
        Ok(self.longitudes.clone())
    }

    fn fetch_slice(
        &self,
        variable: &str,
        times: Range<usize>,
        lats: Range<usize>,
    ) -> Result<ArrayD<f32>> {
        self.calls.borrow_mut().push(variable.to_string());

        let lon_count = self
            .lon_count_override
            .get(variable)
            .copied()
            .unwrap_or(self.longitudes.len());

        let shape = vec![times.len(), self.pressures.len(), lats.len(), lon_count];
        let total: usize = shape.iter().product();
        let values: Vec<f32> = (0..total).map(|i| i as f32).collect();

        if self.flatten.get(variable).copied().unwrap_or(false) {
            return Ok(ArrayD::from_shape_vec(vec![total], values)?);
        }
        Ok(ArrayD::from_shape_vec(shape, values)?)
    }
}

fn noon_window(dataset: &ScriptedDataset) -> windtile::window::TimeWindow {
    let noon = Utc.with_ymd_and_hms(2010, 3, 15, 12, 0, 0).unwrap();
    let range = TimeRange::new(noon - Duration::hours(1), noon + Duration::hours(1)).unwrap();
    select_time_window(&dataset.time_axis, &range).unwrap()
}

#[test]
fn test_fetch_selects_window_axes() {
    let dataset = ScriptedDataset::new();
    let time_window = noon_window(&dataset);
    let window = Window::new(52.0, 2.0, 0.0, 1.0).unwrap();

    let data = fetch_wind_data(&dataset, &time_window, &window).unwrap();

    // Latitude axis narrowed to the window, longitude axis fetched in full
    assert_eq!(data.height.latitudes, vec![50.0, 52.0, 54.0]);
    assert_eq!(data.height.longitudes.len(), 6);
    assert_eq!(data.height.shape(), &[3, 2, 3, 6]);
    assert_eq!(data.height.times.len(), 3);

    // Fixed fetch order: height, u-wind, v-wind
    assert_eq!(
        dataset.calls.borrow().as_slice(),
        ["hgtprs", "ugrdprs", "vgrdprs"]
    );
}

#[test]
fn test_fetch_degenerate_latitude_window() {
    let dataset = ScriptedDataset::new();
    let time_window = noon_window(&dataset);

    // No axis latitude lies within the window; the result is an empty slice
    // and nothing is requested from the source.
    let window = Window::new(-30.0, 1.0, 0.0, 1.0).unwrap();
    let data = fetch_wind_data(&dataset, &time_window, &window).unwrap();

    assert_eq!(data.height.shape(), &[3, 2, 0, 6]);
    assert!(data.height.latitudes.is_empty());
    assert!(dataset.calls.borrow().is_empty());
}

#[test]
fn test_fetch_shape_mismatch_is_fatal() {
    let mut dataset = ScriptedDataset::new();
    dataset
        .lon_count_override
        .insert("ugrdprs".to_string(), 5);
    let time_window = noon_window(&dataset);
    let window = Window::new(52.0, 2.0, 0.0, 1.0).unwrap();

    match fetch_wind_data(&dataset, &time_window, &window) {
        Err(WindTileError::ShapeMismatch {
            variable,
            expected,
            actual,
        }) => {
            assert_eq!(variable, "ugrdprs");
            assert_eq!(expected, vec![3, 2, 3, 6]);
            assert_eq!(actual, vec![3, 2, 3, 5]);
        }
        Err(e) => panic!("expected ShapeMismatch, got {}", e),
        Ok(_) => panic!("expected ShapeMismatch, fetch succeeded"),
    }
}

#[test]
fn test_fetch_rejects_wrong_dimensionality() {
    let mut dataset = ScriptedDataset::new();
    dataset.flatten.insert("hgtprs".to_string(), true);
    let time_window = noon_window(&dataset);
    let window = Window::new(52.0, 2.0, 0.0, 1.0).unwrap();

    match fetch_wind_data(&dataset, &time_window, &window) {
        Err(WindTileError::InsufficientData { variable, .. }) => {
            assert_eq!(variable, "hgtprs")
        }
        Err(e) => panic!("expected InsufficientData, got {}", e),
        Ok(_) => panic!("expected InsufficientData, fetch succeeded"),
    }
}

#[test]
fn test_wind_data_set_direct_shape_check() {
    let dataset = ScriptedDataset::new();
    let time_window = noon_window(&dataset);
    let window = Window::new(52.0, 2.0, 0.0, 1.0).unwrap();

    let data = fetch_wind_data(&dataset, &time_window, &window).unwrap();
    let WindDataSet {
        height,
        wind_u,
        mut wind_v,
    } = data;

    // Re-assembling with a reshaped third variable must fail
    wind_v.values = wind_v
        .values
        .into_shape(vec![3, 2, 6, 3])
        .unwrap()
        .into_dyn();
    assert!(WindDataSet::new(height, wind_u, wind_v).is_err());
}
