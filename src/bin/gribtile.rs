//! Entry point for the gribtile application.
//!
//! Drives the fixed-size raw tile path: optionally downloads a 6°×6° GRIB
//! subset for one model run, then decodes an externally produced wgrib2
//! per-point CSV and writes the standard tile layout. Running wgrib2 itself
//! is left to the caller.

use clap::Parser;
use log::{info, LevelFilter};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use windtile::config::GribConfig;
use windtile::errors::{Result, WindTileError};
use windtile::grib_io::{decode_point_records, download_tile, encode_tile, FetchOutcome};
use windtile::locator::ModelRun;

/// Builds a single wind tile from a raw GRIB subset.
#[derive(Parser, Debug)]
#[command(
    version,
    name = "gribtile",
    about = "Decode a wgrib2 point-record CSV into a wind tile"
)]
struct Args {
    /// wgrib2 CSV file to decode
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Tile file to write
    #[arg(short, long, default_value = "tile.dat")]
    output: PathBuf,

    /// POSIX timestamp recorded in the tile header
    #[arg(short, long)]
    timestamp: i64,

    /// Tile origin latitude in whole degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: i32,

    /// Tile origin longitude in whole degrees
    #[arg(long)]
    lon: i32,

    /// Download the GRIB subset for this model run date (YYYYMMDD) first
    #[arg(long, value_name = "YYYYMMDD")]
    download: Option<String>,

    /// Synoptic cycle hour of the run to download
    #[arg(long, default_value_t = 0)]
    cycle: u32,

    /// Forecast hour of the run to download
    #[arg(long, default_value_t = 0)]
    forecast_hour: u32,

    /// Subsetting endpoint override
    #[arg(long)]
    filter_url: Option<String>,

    /// Be verbose
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn parse_run_date(date: &str, cycle: u32) -> Result<ModelRun> {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WindTileError::Parse {
            message: format!("run date '{}' is not YYYYMMDD", date),
        });
    }
    let field = |range: std::ops::Range<usize>| -> Result<u32> {
        date[range.clone()]
            .parse::<u32>()
            .map_err(|_| WindTileError::Parse {
                message: format!("run date '{}' is not YYYYMMDD", date),
            })
    };

    Ok(ModelRun {
        year: field(0..4)? as i32,
        month: field(4..6)?,
        day: field(6..8)?,
        cycle,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Some(date) = &args.download {
        let run = parse_run_date(date, args.cycle)?;
        let mut config = GribConfig::default();
        if let Some(filter_url) = args.filter_url.clone() {
            config.filter_url = filter_url;
        }

        match download_tile(&config, &run, args.forecast_hour, args.lat, args.lon)? {
            FetchOutcome::Available(path) => {
                info!("GRIB subset saved to {}; decode it with wgrib2 -csv", path.display())
            }
            FetchOutcome::Unavailable => {
                info!("GRIB subset for {} cycle {:02}z is not available yet", date, args.cycle);
                return Ok(());
            }
            FetchOutcome::TransportError { detail } => {
                return Err(WindTileError::Generic(format!(
                    "GRIB transfer failed: {}",
                    detail
                )));
            }
        }
    }

    let input = match &args.input {
        Some(input) => input,
        None => return Ok(()),
    };

    let reader = BufReader::new(File::open(input)?);
    let levels = decode_point_records(reader)?;
    info!("decoded {} pressure levels from {}", levels.len(), input.display());

    let file = File::create(&args.output)?;
    let mut out = BufWriter::new(file);
    encode_tile(
        &mut out,
        &levels,
        args.timestamp,
        args.lat as f64,
        args.lon as f64,
    )?;
    info!("wrote tile {}", args.output.display());

    Ok(())
}
