//! windtile: windowed extraction of gridded wind data into flat tiles
//!
//! A library and pair of command-line tools that reduce gridded
//! numerical-weather-model output (geopotential height and horizontal wind
//! over pressure × latitude × longitude × forecast time) to a bounded
//! geographic and temporal window, serialized into the flat plain-text tile
//! format consumed by an external trajectory predictor.
//!
//! ## Module Organization
//!
//! - [`coords`]: longitude canonicalization and circular distance
//! - [`time`]: the model's fractional-day time axis codec
//! - [`window`]: spatial window and time range selection against dataset axes
//! - [`data_source`]: the gridded dataset collaborator traits and NetCDF impl
//! - [`locator`]: reverse-chronological dataset discovery
//! - [`fetch`]: per-variable slice fetching and shape validation
//! - [`tile_io`]: tile serialization and header reading
//! - [`grib_io`]: the fixed-size raw GRIB tile path
//! - [`scan`]: tile directory scanning
//! - [`config`]: externally supplied paths and endpoints
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use windtile::prelude::*;
//! use chrono::{Duration, Utc};
//!
//! let config = SourceConfig::default();
//! let source = NetcdfSource::new(config);
//!
//! let target = Utc::now();
//! let located = locate_dataset(&source, target).unwrap();
//!
//! let window = Window::new(52.0, 5.0, 0.0, 5.0).unwrap();
//! let range = TimeRange::new(target - Duration::hours(3), target + Duration::hours(9)).unwrap();
//!
//! let time_window = select_time_window(&located.dataset.time_axis().unwrap(), &range).unwrap();
//! let data = fetch_wind_data(located.dataset.as_ref(), &time_window, &window).unwrap();
//!
//! let template = OutputTemplate::default();
//! TileSerializer::new(&data, &window, &template).write_all().unwrap();
//! ```

// Core modules
pub mod config;
pub mod coords;
pub mod data_source;
pub mod errors;
pub mod fetch;
pub mod grib_io;
pub mod locator;
pub mod scan;
pub mod tile_io;
pub mod time;
pub mod window;

// Binary support
pub mod cli;

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{GribConfig, OutputTemplate, SourceConfig};
    pub use crate::coords::{angular_distance, canonicalize_longitude};
    pub use crate::data_source::{GridDataset, GridSource, NetcdfSource};
    pub use crate::errors::{Result, WindTileError};
    pub use crate::fetch::{fetch_wind_data, GriddedVariable, WindDataSet};
    pub use crate::grib_io::{decode_point_records, download_tile, encode_tile, FetchOutcome};
    pub use crate::locator::{locate_dataset, CandidateRuns, ModelRun};
    pub use crate::tile_io::{read_header, TileHeader, TileSerializer};
    pub use crate::window::{select_time_window, TimeRange, TimeWindow, Window};
}
