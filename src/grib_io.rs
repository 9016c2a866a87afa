//! Raw GRIB tile path
//!
//! An alternate, fixed-size route to the same tile layout: a single 6°×6°
//! GRIB subset is downloaded per model run and forecast hour, decoded
//! externally (wgrib2) to per-point text records, reassembled here into one
//! 13×13 grid per pressure level, and serialized through the same layout
//! writer as the windowed path.

use crate::config::GribConfig;
use crate::errors::{Result, WindTileError};
use crate::locator::ModelRun;
use crate::tile_io::{write_tile, TileHeader};
use log::{debug, info};
use ndarray::Array3;
use reqwest::blocking::Client;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Points per tile side. Must match the downstream predictor's grid.
pub const TILE_POINTS: usize = 13;

/// Tile extent in degrees along each side.
pub const TILE_EXTENT_DEG: f64 = 6.0;

/// Grid resolution of the subsetted model output, degrees per point.
pub const GRIB_RESOLUTION: f64 = 0.5;

/// Pressure levels requested from the subsetting endpoint, hectopascals.
const PRESSURE_LEVELS_MB: [u32; 26] = [
    1000, 975, 950, 925, 900, 850, 800, 750, 700, 650, 600, 550, 500, 450, 400, 350, 300, 250,
    200, 150, 100, 70, 50, 30, 20, 10,
];

/// Maximum forecast hour served by the subsetting endpoint.
const MAX_FORECAST_HOUR: u32 = 180;

/// The three physical components of a grid point, in data-line order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Height,
    WindU,
    WindV,
}

impl Component {
    fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "HGT" => Ok(Component::Height),
            "UGRD" => Ok(Component::WindU),
            "VGRD" => Ok(Component::WindV),
            other => Err(WindTileError::Parse {
                message: format!("unknown entry type tag '{}'", other),
            }),
        }
    }

    fn index(&self) -> usize {
        match self {
            Component::Height => 0,
            Component::WindU => 1,
            Component::WindV => 2,
        }
    }
}

/// One pressure level's 13×13×3 point array, anchored at a tile origin.
#[derive(Debug, Clone)]
pub struct RawGribTile {
    pub origin_lat: f64,
    pub origin_lon: f64,
    /// Indexed (lat offset, lon offset, component).
    pub values: Array3<f32>,
}

impl RawGribTile {
    fn new(origin_lat: f64, origin_lon: f64) -> Self {
        Self {
            origin_lat,
            origin_lon,
            values: Array3::zeros((TILE_POINTS, TILE_POINTS, 3)),
        }
    }

    /// Places one decoded value at its integer grid offsets.
    fn place(&mut self, lat: f64, lon: f64, component: Component, value: f32) -> Result<()> {
        let lat_idx = grid_offset(lat, self.origin_lat)?;
        let lon_idx = grid_offset(lon, self.origin_lon)?;
        self.values[[lat_idx, lon_idx, component.index()]] = value;
        Ok(())
    }
}

/// Integer grid offset of a coordinate from the tile origin.
fn grid_offset(coordinate: f64, origin: f64) -> Result<usize> {
    let offset = ((coordinate - origin) / GRIB_RESOLUTION).floor();
    if offset < 0.0 || offset >= TILE_POINTS as f64 {
        return Err(WindTileError::Domain {
            message: format!(
                "coordinate {} is outside the tile anchored at {} ({} points at {}°)",
                coordinate, origin, TILE_POINTS, GRIB_RESOLUTION
            ),
        });
    }
    Ok(offset as usize)
}

/// Decodes a wgrib2 per-point record stream into per-pressure-level tiles.
///
/// Each record's trailing fields are
/// `entry_type, pressure_level, longitude, latitude, value`; the first
/// record seen for a new pressure level fixes that level's tile origin.
/// Levels are keyed by pressure so iteration is deterministic.
pub fn decode_point_records<R: BufRead>(reader: R) -> Result<BTreeMap<i64, RawGribTile>> {
    let mut levels: BTreeMap<i64, RawGribTile> = BTreeMap::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 5 {
            return Err(WindTileError::Parse {
                message: format!("record on line {} has {} fields, expected at least 5", line_no + 1, fields.len()),
            });
        }

        let tail = &fields[fields.len() - 5..];
        let component = Component::from_tag(tail[0].trim().trim_matches('"'))?;
        let level = parse_pressure_level(tail[1])?;
        let lon = parse_coord(tail[2], line_no)?;
        let lat = parse_coord(tail[3], line_no)?;
        let value = parse_coord(tail[4], line_no)? as f32;

        let tile = levels
            .entry(level)
            .or_insert_with(|| RawGribTile::new(lat, lon));
        tile.place(lat, lon, component, value)?;
    }

    debug!("decoded {} pressure levels", levels.len());
    Ok(levels)
}

/// Strips the quoting and unit suffix from a level field such as `"550 mb"`.
fn parse_pressure_level(field: &str) -> Result<i64> {
    let text = field.trim().trim_matches('"');
    let number = text.strip_suffix("mb").unwrap_or(text).trim();
    number.parse::<i64>().map_err(|_| WindTileError::Parse {
        message: format!("bad pressure level field '{}'", field),
    })
}

fn parse_coord(field: &str, line_no: usize) -> Result<f64> {
    field.trim().parse::<f64>().map_err(|_| WindTileError::Parse {
        message: format!("bad numeric field '{}' on line {}", field, line_no + 1),
    })
}

/// Serializes decoded levels into the standard tile layout for one time step.
///
/// The tile's window center is the tile center; the half-widths are half the
/// tile extent. Levels are written in descending pressure order, matching
/// the model's surface-first level axis.
pub fn encode_tile<W: Write>(
    out: &mut W,
    levels: &BTreeMap<i64, RawGribTile>,
    timestamp: i64,
    origin_lat: f64,
    origin_lon: f64,
) -> Result<()> {
    let pressures: Vec<f64> = levels.keys().rev().map(|&p| p as f64).collect();
    let latitudes: Vec<f64> = (0..TILE_POINTS)
        .map(|i| origin_lat + i as f64 * GRIB_RESOLUTION)
        .collect();
    let longitudes: Vec<f64> = (0..TILE_POINTS)
        .map(|i| origin_lon + i as f64 * GRIB_RESOLUTION)
        .collect();

    let tiles: Vec<&RawGribTile> = levels.values().rev().collect();

    let half_extent = TILE_EXTENT_DEG / 2.0;
    let header = TileHeader {
        center_lat: origin_lat + half_extent,
        lat_delta: half_extent,
        center_lon: origin_lon + half_extent,
        lon_delta: half_extent,
        timestamp,
    };

    write_tile(
        out,
        &header,
        &pressures,
        &latitudes,
        &longitudes,
        |pressure_idx, lat_idx, lon_idx| {
            let values = &tiles[pressure_idx].values;
            [
                values[[lat_idx, lon_idx, 0]],
                values[[lat_idx, lon_idx, 1]],
                values[[lat_idx, lon_idx, 2]],
            ]
        },
    )
}

/// Outcome of a remote tile retrieval.
///
/// "Not found" is an expected signal (the run simply is not published yet),
/// distinct from a transport failure; callers must handle each case.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The GRIB subset was downloaded to the given path.
    Available(PathBuf),
    /// The server does not (yet) have this run/forecast hour.
    Unavailable,
    /// The transfer itself failed.
    TransportError { detail: String },
}

/// Downloads one 6°×6° GRIB subset for a model run and forecast hour.
///
/// `lat` and `lon` are the tile origin in whole degrees. Issued as a single
/// blocking request; never retried.
pub fn download_tile(
    config: &GribConfig,
    run: &ModelRun,
    forecast_hour: u32,
    lat: i32,
    lon: i32,
) -> Result<FetchOutcome> {
    if run.cycle % 6 != 0 || run.cycle > 18 {
        return Err(WindTileError::Domain {
            message: format!("cycle must be 0, 6, 12 or 18, got {}", run.cycle),
        });
    }
    if forecast_hour % 3 != 0 || forecast_hour > MAX_FORECAST_HOUR {
        return Err(WindTileError::Domain {
            message: format!(
                "forecast hour must be a multiple of 3 and at most {}, got {}",
                MAX_FORECAST_HOUR, forecast_hour
            ),
        });
    }

    let run_date = format!("{:04}{:02}{:02}", run.year, run.month, run.day);
    let mut query: Vec<(String, String)> = vec![(
        "file".to_string(),
        format!("gfs.t{:02}z.mastergrb2f{:02}", run.cycle, forecast_hour),
    )];
    for level in PRESSURE_LEVELS_MB {
        query.push((format!("lev_{}_mb", level), "on".to_string()));
    }
    for var in ["var_HGT", "var_UGRD", "var_VGRD"] {
        query.push((var.to_string(), "on".to_string()));
    }
    query.push(("subregion".to_string(), String::new()));
    query.push(("leftlon".to_string(), lon.to_string()));
    query.push((
        "rightlon".to_string(),
        (lon + TILE_EXTENT_DEG as i32).to_string(),
    ));
    query.push((
        "toplat".to_string(),
        (lat + TILE_EXTENT_DEG as i32).to_string(),
    ));
    query.push(("bottomlat".to_string(), lat.to_string()));
    query.push((
        "dir".to_string(),
        format!("/gfs.{}{:02}/master", run_date, run.cycle),
    ));

    let client = Client::new();
    let response = match client.get(&config.filter_url).query(&query).send() {
        Ok(response) => response,
        Err(e) => {
            return Ok(FetchOutcome::TransportError {
                detail: e.to_string(),
            })
        }
    };

    let status = response.status();
    if status.as_u16() == 404 {
        return Ok(FetchOutcome::Unavailable);
    }
    if !status.is_success() {
        return Ok(FetchOutcome::TransportError {
            detail: format!("HTTP status {}", status.as_u16()),
        });
    }

    let filename = format!(
        "{}{:02}_{:02}_{}_{}.grb",
        run_date, run.cycle, forecast_hour, lat, lon
    );
    let path = config.download_dir.join(filename);
    let body = match response.bytes() {
        Ok(body) => body,
        Err(e) => {
            return Ok(FetchOutcome::TransportError {
                detail: e.to_string(),
            })
        }
    };

    let mut file = File::create(&path)?;
    file.write_all(&body)?;
    info!("downloaded GRIB subset to {}", path.display());

    Ok(FetchOutcome::Available(path))
}
