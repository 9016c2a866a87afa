//! Gridded dataset collaborator abstraction
//!
//! The extraction pipeline only talks to the remote model through these two
//! traits: [`GridSource`] resolves a dataset identifier to an open handle,
//! [`GridDataset`] exposes the declared axes and ranged sub-array reads.
//! Keeping the seam here lets the locator and fetcher run against in-memory
//! sources in tests while production uses the NetCDF/DAP implementation.

use crate::config::SourceConfig;
use crate::errors::{Result, WindTileError};
use log::{debug, info};
use ndarray::ArrayD;
use std::ops::Range;
use std::path::PathBuf;

/// Resolves dataset identifiers to open dataset handles.
///
/// Opening may fail per identifier (datasets are published and withdrawn on
/// the server's schedule); the locator treats such failures as "try the next
/// candidate".
pub trait GridSource {
    fn open_dataset(&self, id: &str) -> Result<Box<dyn GridDataset>>;
}

/// One open gridded dataset with (time, pressure, lat, lon) variables.
pub trait GridDataset {
    /// Raw time axis values in the model's fractional-day encoding,
    /// ascending.
    fn time_axis(&self) -> Result<Vec<f64>>;

    /// Pressure level axis in hectopascals.
    fn pressure_axis(&self) -> Result<Vec<f64>>;

    /// Latitude axis in degrees, monotonic.
    fn latitude_axis(&self) -> Result<Vec<f64>>;

    /// Longitude axis in degrees, values in [0, 360).
    fn longitude_axis(&self) -> Result<Vec<f64>>;

    /// Reads one variable over `times` and `lats`, all pressure levels and
    /// the full longitude axis, as a (time, pressure, lat, lon) array.
    fn fetch_slice(
        &self,
        variable: &str,
        times: Range<usize>,
        lats: Range<usize>,
    ) -> Result<ArrayD<f32>>;
}

/// NetCDF-backed source: identifiers resolve against a base URL, with an
/// opportunistic local cache consulted first.
pub struct NetcdfSource {
    config: SourceConfig,
}

impl NetcdfSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Cache file for a dataset identifier, if a cache directory is set.
    fn cache_path(&self, id: &str) -> Option<PathBuf> {
        self.config
            .cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.nc", id.replace('/', "_"))))
    }
}

impl GridSource for NetcdfSource {
    fn open_dataset(&self, id: &str) -> Result<Box<dyn GridDataset>> {
        if let Some(cached) = self.cache_path(id) {
            if cached.exists() {
                info!("using cached dataset {}", cached.display());
                let file = netcdf::open(&cached)?;
                return Ok(Box::new(NetcdfDataset { file }));
            }
        }

        let location = format!("{}/{}", self.config.base_url.trim_end_matches('/'), id);
        debug!("opening dataset at {}", location);
        let file = netcdf::open(&location)?;
        Ok(Box::new(NetcdfDataset { file }))
    }
}

/// An open NetCDF dataset (local file or DAP URL).
pub struct NetcdfDataset {
    file: netcdf::File,
}

impl NetcdfDataset {
    fn axis(&self, name: &str) -> Result<Vec<f64>> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| WindTileError::VariableNotFound {
                var: name.to_string(),
            })?;
        Ok(var.get_values::<f64, _>(..)?)
    }
}

impl GridDataset for NetcdfDataset {
    fn time_axis(&self) -> Result<Vec<f64>> {
        self.axis("time")
    }

    fn pressure_axis(&self) -> Result<Vec<f64>> {
        self.axis("lev")
    }

    fn latitude_axis(&self) -> Result<Vec<f64>> {
        self.axis("lat")
    }

    fn longitude_axis(&self) -> Result<Vec<f64>> {
        self.axis("lon")
    }

    fn fetch_slice(
        &self,
        variable: &str,
        times: Range<usize>,
        lats: Range<usize>,
    ) -> Result<ArrayD<f32>> {
        let var = self
            .file
            .variable(variable)
            .ok_or_else(|| WindTileError::VariableNotFound {
                var: variable.to_string(),
            })?;

        let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        if dims.len() != 4 {
            return Err(WindTileError::InvalidSlice {
                message: format!(
                    "variable '{}' has {} dimensions, expected (time, lev, lat, lon)",
                    variable,
                    dims.len()
                ),
            });
        }

        for (range, (axis, size)) in [(&times, ("time", dims[0])), (&lats, ("lat", dims[2]))] {
            if range.start >= range.end || range.end > size {
                return Err(WindTileError::InvalidSlice {
                    message: format!(
                        "range {}:{} outside {} axis of length {}",
                        range.start, range.end, axis, size
                    ),
                });
            }
        }

        let shape = [
            times.end - times.start,
            dims[1],
            lats.end - lats.start,
            dims[3],
        ];
        let values: Vec<f32> =
            var.get_values::<f32, _>((times, 0..dims[1], lats, 0..dims[3]))?;

        Ok(ArrayD::from_shape_vec(shape.to_vec(), values)?)
    }
}
