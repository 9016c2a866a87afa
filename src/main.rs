//! Entry point for the windtile application.
//!
//! Parses the CLI, locates the newest dataset covering the requested
//! instant, extracts the spatial/temporal window and writes one tile per
//! forecast time step.

use chrono::{Duration, Utc};
use clap::Parser;
use log::{info, LevelFilter};

use windtile::cli::Args;
use windtile::config::{OutputTemplate, SourceConfig};
use windtile::data_source::{GridDataset, NetcdfSource};
use windtile::errors::Result;
use windtile::fetch::fetch_wind_data;
use windtile::locator::locate_dataset;
use windtile::scan::latest_tile_timestamp;
use windtile::tile_io::TileSerializer;
use windtile::time::posix_to_datetime;
use windtile::window::{select_time_window, TimeRange, Window};

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

    if let Some(dir) = &args.scan_latest {
        match latest_tile_timestamp(dir)? {
            Some(timestamp) => println!("{}", timestamp),
            None => println!("no tiles found in {}", dir.display()),
        }
        return Ok(());
    }

    let target = match args.timestamp {
        Some(timestamp) => posix_to_datetime(timestamp)?,
        None => Utc::now(),
    };
    info!("looking for the latest dataset covering {}", target);

    let mut config = SourceConfig::default();
    if let Some(base_url) = args.base_url.clone() {
        config.base_url = base_url;
    }
    config.cache_dir = args.cache_dir.clone();

    let source = NetcdfSource::new(config);
    let located = locate_dataset(&source, target)?;

    let window = Window::new(args.lat, args.latdelta, args.lon, args.londelta)?;
    let range = TimeRange::new(
        target - Duration::hours(args.past),
        target + Duration::hours(args.future),
    )?;

    let time_axis = located.dataset.time_axis()?;
    let time_window = select_time_window(&time_axis, &range)?;
    info!(
        "dataset {} covers the window: {} -> {} ({} steps)",
        located.id,
        time_window.first_instant,
        time_window.last_instant,
        time_window.steps()
    );

    let data = fetch_wind_data(located.dataset.as_ref(), &time_window, &window)?;

    let template = OutputTemplate::new(args.output.clone());
    let paths = TileSerializer::new(&data, &window, &template).write_all()?;
    info!("wrote {} tiles", paths.len());

    Ok(())
}
