//! Wind tile serialization
//!
//! One tile file per selected time step, in the flat plain-text layout the
//! downstream trajectory predictor consumes: a commented header record, the
//! three axis sections, then one comma-separated data line per
//! (pressure, latitude, longitude) combination in pressure-major order. The
//! longitude values written are exactly the window-filtered set, in filtered
//! order, and the data lines iterate longitudes in that same order.

use crate::config::OutputTemplate;
use crate::errors::{Result, WindTileError};
use crate::fetch::WindDataSet;
use crate::time::datetime_to_posix;
use crate::window::Window;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// The five-field record leading every tile file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileHeader {
    pub center_lat: f64,
    pub lat_delta: f64,
    pub center_lon: f64,
    pub lon_delta: f64,
    pub timestamp: i64,
}

/// Number of physical values per data line: height, u-wind, v-wind.
pub const COMPONENTS_PER_LINE: usize = 3;

/// Writes the complete tile layout to `out`.
///
/// `value_at(pressure_idx, lat_idx, lon_idx)` supplies the three components
/// for one point; lon_idx indexes into `longitudes` (the filtered set), not
/// the source axis.
pub fn write_tile<W: Write>(
    out: &mut W,
    header: &TileHeader,
    pressures: &[f64],
    latitudes: &[f64],
    longitudes: &[f64],
    mut value_at: impl FnMut(usize, usize, usize) -> [f32; COMPONENTS_PER_LINE],
) -> Result<()> {
    writeln!(
        out,
        "# header: center_lat, lat_delta, center_lon, lon_delta, timestamp"
    )?;
    writeln!(
        out,
        "{},{},{},{},{}",
        header.center_lat, header.lat_delta, header.center_lon, header.lon_delta, header.timestamp
    )?;

    writeln!(out, "# num_axes")?;
    writeln!(out, "3")?;

    write_axis(out, "axis 1: pressures", pressures)?;
    write_axis(out, "axis 2: latitudes", latitudes)?;
    write_axis(out, "axis 3: longitudes", longitudes)?;

    let data_lines = pressures.len() * latitudes.len() * longitudes.len();
    writeln!(out, "# number of lines of data")?;
    writeln!(out, "{}", data_lines)?;
    writeln!(out, "# data line component count")?;
    writeln!(out, "{}", COMPONENTS_PER_LINE)?;

    for pressure_idx in 0..pressures.len() {
        for lat_idx in 0..latitudes.len() {
            for lon_idx in 0..longitudes.len() {
                let [height, wind_u, wind_v] = value_at(pressure_idx, lat_idx, lon_idx);
                writeln!(out, "{},{},{}", height, wind_u, wind_v)?;
            }
        }
    }

    Ok(())
}

fn write_axis<W: Write>(out: &mut W, label: &str, values: &[f64]) -> Result<()> {
    writeln!(out, "# {}", label)?;
    writeln!(out, "{}", values.len())?;
    let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    writeln!(out, "{}", joined.join(","))?;
    Ok(())
}

/// Serializes a fetched dataset into one tile file per time step.
pub struct TileSerializer<'a> {
    data: &'a WindDataSet,
    window: &'a Window,
    template: &'a OutputTemplate,
}

impl<'a> TileSerializer<'a> {
    pub fn new(data: &'a WindDataSet, window: &'a Window, template: &'a OutputTemplate) -> Self {
        Self {
            data,
            window,
            template,
        }
    }

    /// Writes every time step, returning the paths written in time order.
    pub fn write_all(&self) -> Result<Vec<PathBuf>> {
        let height = &self.data.height;

        // The filtered longitude set is a property of the window and grid
        // alone; compute it once and reuse it for every time step.
        let lon_indices = self.window.longitude_indices(&height.longitudes);
        let longitudes: Vec<f64> = lon_indices.iter().map(|&i| height.longitudes[i]).collect();
        debug!(
            "window selects {} of {} longitudes, {} latitudes",
            longitudes.len(),
            height.longitudes.len(),
            height.latitudes.len()
        );

        let mut paths = Vec::with_capacity(height.times.len());
        for (time_idx, &instant) in height.times.iter().enumerate() {
            let timestamp = datetime_to_posix(instant);
            let path = self.template.render(
                timestamp,
                self.window.center_lat,
                self.window.center_lon,
                self.window.lat_delta,
                self.window.lon_delta,
            );

            let header = TileHeader {
                center_lat: self.window.center_lat,
                lat_delta: self.window.lat_delta,
                center_lon: self.window.center_lon,
                lon_delta: self.window.lon_delta,
                timestamp,
            };

            let file = File::create(&path)?;
            let mut out = BufWriter::new(file);
            write_tile(
                &mut out,
                &header,
                &height.pressures,
                &height.latitudes,
                &longitudes,
                |pressure_idx, lat_idx, lon_idx| {
                    let source_lon = lon_indices[lon_idx];
                    let at = [time_idx, pressure_idx, lat_idx, source_lon];
                    [
                        self.data.height.values[at],
                        self.data.wind_u.values[at],
                        self.data.wind_v.values[at],
                    ]
                },
            )?;
            out.flush()?;

            info!("wrote tile {} for {}", path.display(), instant);
            paths.push(path);
        }

        Ok(paths)
    }
}

/// Reads the header record of an existing tile file, skipping comment lines.
pub fn read_header(path: &Path) -> Result<TileHeader> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() != 5 {
            return Err(WindTileError::Parse {
                message: format!(
                    "tile header in {} has {} fields, expected 5",
                    path.display(),
                    fields.len()
                ),
            });
        }

        let parse_f64 = |field: &str| -> Result<f64> {
            field.parse::<f64>().map_err(|_| WindTileError::Parse {
                message: format!("bad header field '{}' in {}", field, path.display()),
            })
        };

        return Ok(TileHeader {
            center_lat: parse_f64(fields[0])?,
            lat_delta: parse_f64(fields[1])?,
            center_lon: parse_f64(fields[2])?,
            lon_delta: parse_f64(fields[3])?,
            timestamp: fields[4].parse::<i64>().map_err(|_| WindTileError::Parse {
                message: format!("bad header timestamp '{}' in {}", fields[4], path.display()),
            })?,
        });
    }

    Err(WindTileError::Parse {
        message: format!("{} has no header record", path.display()),
    })
}
