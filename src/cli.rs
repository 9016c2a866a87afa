//! Defines command-line interface options using `clap` for the windtile binary.

use clap::Parser;
use std::path::PathBuf;

/// Fetches a windowed subset of GFS wind/height data and writes one wind
/// tile per forecast time step.
#[derive(Parser, Debug)]
#[command(
    version,
    name = "windtile",
    about = "Extract windowed GFS wind data into flat wind tiles"
)]
pub struct Args {
    /// POSIX timestamp to search for a dataset covering. Defaults to now.
    #[arg(short, long)]
    pub timestamp: Option<i64>,

    /// Window center latitude in degrees
    #[arg(long, default_value_t = 52.0, allow_hyphen_values = true)]
    pub lat: f64,

    /// Window center longitude in degrees (any value; canonicalized to [0, 360))
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub lon: f64,

    /// Latitude half-width of the window in degrees
    #[arg(long, default_value_t = 5.0)]
    pub latdelta: f64,

    /// Longitude half-width of the window in degrees
    #[arg(long, default_value_t = 5.0)]
    pub londelta: f64,

    /// Hours before the target time to start saving data
    #[arg(short, long, default_value_t = 3)]
    pub past: i64,

    /// Hours after the target time to stop saving data
    #[arg(short, long, default_value_t = 9)]
    pub future: i64,

    /// Output path template; {timestamp}, {lat}, {lon}, {latdelta} and
    /// {londelta} are substituted per time step
    #[arg(
        short,
        long,
        default_value = "gfs_{timestamp}_{lat}_{lon}_{latdelta}_{londelta}.dat"
    )]
    pub output: String,

    /// Base URL the dataset identifiers resolve against
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory of previously retrieved datasets, consulted before the
    /// base URL
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Print the latest timestamp covered by the tiles in DIR and exit
    #[arg(long, value_name = "DIR")]
    pub scan_latest: Option<PathBuf>,

    /// Be verbose
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
