//! Tile directory scanning
//!
//! The hourly prediction driver needs to know how far into the future the
//! already-written tiles reach. Scanning reads only each tile's header
//! record, never the data body.

use crate::errors::Result;
use crate::tile_io::read_header;
use log::{debug, warn};
use std::path::Path;

/// Greatest POSIX timestamp covered by any `*.dat` tile in `dir`, or `None`
/// when the directory holds no readable tiles.
///
/// Unreadable or malformed tiles are skipped with a warning rather than
/// aborting the scan.
pub fn latest_tile_timestamp(dir: &Path) -> Result<Option<i64>> {
    let mut latest: Option<i64> = None;

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(true, |ext| ext != "dat") {
            continue;
        }

        match read_header(&path) {
            Ok(header) => {
                debug!(
                    "tile {} covers timestamp {}",
                    path.display(),
                    header.timestamp
                );
                latest = Some(latest.map_or(header.timestamp, |t| t.max(header.timestamp)));
            }
            Err(e) => warn!("skipping unreadable tile {}: {}", path.display(), e),
        }
    }

    Ok(latest)
}
