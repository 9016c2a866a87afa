//! Externally supplied configuration
//!
//! Every remote endpoint and local path the crate touches arrives through one
//! of these objects; nothing is an embedded constant. Defaults mirror the
//! public NOMADS endpoints but callers may override every field.

use std::path::PathBuf;

/// Configuration for the gridded dataset collaborator.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL (or directory) that dataset identifiers resolve against.
    pub base_url: String,
    /// Directory holding previously retrieved datasets. Consulted
    /// opportunistically; a hit must not change the logical result.
    pub cache_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://nomads.ncep.noaa.gov:9090/dods/gfs_hd".to_string(),
            cache_dir: None,
        }
    }
}

/// Configuration for raw GRIB tile retrieval.
#[derive(Debug, Clone)]
pub struct GribConfig {
    /// Subsetting endpoint serving single-tile GRIB files.
    pub filter_url: String,
    /// Directory downloaded GRIB files are written into.
    pub download_dir: PathBuf,
}

impl Default for GribConfig {
    fn default() -> Self {
        Self {
            filter_url: "http://nomads.ncep.noaa.gov/cgi-bin/filter_gfs_hd.pl".to_string(),
            download_dir: PathBuf::from("."),
        }
    }
}

/// Output path template for serialized tiles.
///
/// Placeholders `{timestamp}`, `{lat}`, `{lon}`, `{latdelta}` and
/// `{londelta}` are substituted once per time step. This template is the
/// only external-facing configuration surface of the serializer.
#[derive(Debug, Clone)]
pub struct OutputTemplate(String);

impl OutputTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Substitutes all placeholders for one time step.
    pub fn render(
        &self,
        timestamp: i64,
        lat: f64,
        lon: f64,
        lat_delta: f64,
        lon_delta: f64,
    ) -> PathBuf {
        let rendered = self
            .0
            .replace("{timestamp}", &timestamp.to_string())
            .replace("{lat}", &lat.to_string())
            .replace("{lon}", &lon.to_string())
            .replace("{latdelta}", &lat_delta.to_string())
            .replace("{londelta}", &lon_delta.to_string());
        PathBuf::from(rendered)
    }
}

impl Default for OutputTemplate {
    fn default() -> Self {
        Self("gfs_{timestamp}_{lat}_{lon}_{latdelta}_{londelta}.dat".to_string())
    }
}
