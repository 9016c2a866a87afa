//! Tile serialization round-trip, path templating and directory scanning.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ndarray::{ArrayD, IxDyn};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use windtile::{
    config::OutputTemplate,
    errors::Result,
    fetch::{GriddedVariable, WindDataSet},
    scan::latest_tile_timestamp,
    tile_io::{read_header, TileHeader, TileSerializer},
    time::datetime_to_posix,
    window::Window,
};

/// Everything a tile file contains, re-parsed for comparison.
struct ParsedTile {
    header: TileHeader,
    axes: Vec<Vec<f64>>,
    declared_lines: usize,
    components_per_line: usize,
    data: Vec<Vec<f64>>,
}

/// Re-parses a tile file: comment lines are skipped, sections are read in
/// the fixed layout order.
fn parse_tile(path: &Path) -> Result<ParsedTile> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines().filter(|l| !l.starts_with('#'));

    let mut next = || {
        lines
            .next()
            .map(str::to_string)
            .ok_or_else(|| windtile::errors::WindTileError::Parse {
                message: "tile truncated".to_string(),
            })
    };

    let header_fields: Vec<f64> = next()?
        .split(',')
        .map(|f| f.parse::<f64>().unwrap())
        .collect();
    assert_eq!(header_fields.len(), 5);
    let header = TileHeader {
        center_lat: header_fields[0],
        lat_delta: header_fields[1],
        center_lon: header_fields[2],
        lon_delta: header_fields[3],
        timestamp: header_fields[4] as i64,
    };

    let num_axes: usize = next()?.parse().unwrap();
    let mut axes = Vec::new();
    for _ in 0..num_axes {
        let count: usize = next()?.parse().unwrap();
        let values: Vec<f64> = if count == 0 {
            assert_eq!(next()?, "");
            Vec::new()
        } else {
            next()?.split(',').map(|v| v.parse().unwrap()).collect()
        };
        assert_eq!(values.len(), count);
        axes.push(values);
    }

    let declared_lines: usize = next()?.parse().unwrap();
    let components_per_line: usize = next()?.parse().unwrap();

    let mut data = Vec::new();
    while let Ok(line) = next() {
        let fields: Vec<f64> = line.split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(fields.len(), components_per_line);
        data.push(fields);
    }

    Ok(ParsedTile {
        header,
        axes,
        declared_lines,
        components_per_line,
        data,
    })
}

/// Builds a dataset whose values encode their own indices:
/// `base + time*1000 + pressure*100 + lat*10 + lon`.
fn synthetic_data(
    times: Vec<DateTime<Utc>>,
    pressures: Vec<f64>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
) -> WindDataSet {
    let shape = [
        times.len(),
        pressures.len(),
        latitudes.len(),
        longitudes.len(),
    ];

    let variable = |name: &str, base: f32| GriddedVariable {
        name: name.to_string(),
        values: ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
            base + idx[0] as f32 * 1000.0 + idx[1] as f32 * 100.0 + idx[2] as f32 * 10.0
                + idx[3] as f32
        }),
        times: times.clone(),
        pressures: pressures.clone(),
        latitudes: latitudes.clone(),
        longitudes: longitudes.clone(),
    };

    WindDataSet::new(
        variable("hgtprs", 0.0),
        variable("ugrdprs", 10000.0),
        variable("vgrdprs", 20000.0),
    )
    .unwrap()
}

#[test]
fn test_round_trip_single_step() {
    let dir = tempdir().unwrap();
    let instant = Utc.with_ymd_and_hms(2010, 3, 15, 12, 0, 0).unwrap();

    // 2 pressures x 2 latitudes x 2 longitudes, one time step
    let data = synthetic_data(
        vec![instant],
        vec![1000.0, 500.0],
        vec![51.0, 53.0],
        vec![359.0, 1.0],
    );
    let window = Window::new(52.0, 2.0, 0.0, 2.0).unwrap();
    let template = OutputTemplate::new(
        dir.path()
            .join("gfs_{timestamp}_{lat}_{lon}_{latdelta}_{londelta}.dat")
            .to_string_lossy()
            .to_string(),
    );

    let paths = TileSerializer::new(&data, &window, &template)
        .write_all()
        .unwrap();
    assert_eq!(paths.len(), 1);

    let expected_ts = datetime_to_posix(instant);
    assert!(paths[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .contains(&format!("gfs_{}_52_0_2_2", expected_ts)));

    let tile = parse_tile(&paths[0]).unwrap();
    assert_eq!(
        tile.header,
        TileHeader {
            center_lat: 52.0,
            lat_delta: 2.0,
            center_lon: 0.0,
            lon_delta: 2.0,
            timestamp: expected_ts,
        }
    );

    assert_eq!(tile.axes.len(), 3);
    assert_eq!(tile.axes[0], vec![1000.0, 500.0]);
    assert_eq!(tile.axes[1], vec![51.0, 53.0]);
    assert_eq!(tile.axes[2], vec![359.0, 1.0]);

    assert_eq!(tile.declared_lines, 8);
    assert_eq!(tile.components_per_line, 3);
    assert_eq!(tile.data.len(), 8);

    // Pressure-major, lat-major, lon-minor ordering; each line is
    // (height, u-wind, v-wind) for the same point
    for (line_no, line) in tile.data.iter().enumerate() {
        let lon = line_no % 2;
        let lat = (line_no / 2) % 2;
        let pressure = line_no / 4;
        let encoded = (pressure * 100 + lat * 10 + lon) as f64;
        assert_eq!(line[0], encoded);
        assert_eq!(line[1], encoded + 10000.0);
        assert_eq!(line[2], encoded + 20000.0);
    }

    // The header reader sees the same record the parser does
    assert_eq!(read_header(&paths[0]).unwrap(), tile.header);
}

#[test]
fn test_serializer_filters_longitudes_per_window() {
    let dir = tempdir().unwrap();
    let instant = Utc.with_ymd_and_hms(2010, 3, 15, 12, 0, 0).unwrap();

    // Full axis crosses the seam; only values within 2 degrees of lon 0
    // belong in the tile, in original axis order.
    let data = synthetic_data(
        vec![instant],
        vec![1000.0],
        vec![52.0],
        vec![0.0, 1.0, 90.0, 180.0, 358.0, 359.0],
    );
    let window = Window::new(52.0, 2.0, 0.0, 2.0).unwrap();
    let template =
        OutputTemplate::new(dir.path().join("{timestamp}.dat").to_string_lossy().to_string());

    let paths = TileSerializer::new(&data, &window, &template)
        .write_all()
        .unwrap();
    let tile = parse_tile(&paths[0]).unwrap();

    assert_eq!(tile.axes[2], vec![0.0, 1.0, 358.0, 359.0]);
    assert_eq!(tile.data.len(), 4);

    // Data lines follow the filtered order: source lon indices 0, 1, 4, 5
    let heights: Vec<f64> = tile.data.iter().map(|line| line[0]).collect();
    assert_eq!(heights, vec![0.0, 1.0, 4.0, 5.0]);
}

#[test]
fn test_serializer_degenerate_window_emits_no_data_lines() {
    let dir = tempdir().unwrap();
    let instant = Utc.with_ymd_and_hms(2010, 3, 15, 12, 0, 0).unwrap();

    let data = synthetic_data(
        vec![instant],
        vec![1000.0, 500.0],
        vec![52.0],
        vec![90.0, 91.0],
    );
    // Window nowhere near the longitude axis
    let window = Window::new(52.0, 2.0, 270.0, 1.0).unwrap();
    let template =
        OutputTemplate::new(dir.path().join("{timestamp}.dat").to_string_lossy().to_string());

    let paths = TileSerializer::new(&data, &window, &template)
        .write_all()
        .unwrap();
    let tile = parse_tile(&paths[0]).unwrap();

    assert!(tile.axes[2].is_empty());
    assert_eq!(tile.declared_lines, 0);
    assert!(tile.data.is_empty());
}

#[test]
fn test_one_file_per_time_step() {
    let dir = tempdir().unwrap();
    let base = Utc.with_ymd_and_hms(2010, 3, 15, 12, 0, 0).unwrap();
    let times: Vec<DateTime<Utc>> = (0..3).map(|h| base + Duration::hours(h)).collect();

    let data = synthetic_data(times.clone(), vec![1000.0], vec![52.0], vec![0.0]);
    let window = Window::new(52.0, 2.0, 0.0, 2.0).unwrap();
    let template =
        OutputTemplate::new(dir.path().join("{timestamp}.dat").to_string_lossy().to_string());

    let paths = TileSerializer::new(&data, &window, &template)
        .write_all()
        .unwrap();
    assert_eq!(paths.len(), 3);

    for (idx, path) in paths.iter().enumerate() {
        let header = read_header(path).unwrap();
        assert_eq!(header.timestamp, datetime_to_posix(times[idx]));

        // Time steps differ in the time component of the encoded values
        let tile = parse_tile(path).unwrap();
        assert_eq!(tile.data[0][0], idx as f64 * 1000.0);
    }
}

#[test]
fn test_output_template_substitution() {
    let template = OutputTemplate::new("tiles/gfs_{timestamp}_{lat}_{lon}_{latdelta}_{londelta}.dat");
    let path = template.render(1268654400, 52.0, 358.0, 5.0, 2.5);
    assert_eq!(
        path.to_string_lossy(),
        "tiles/gfs_1268654400_52_358_5_2.5.dat"
    );
}

#[test]
fn test_scan_latest_tile_timestamp() {
    let dir = tempdir().unwrap();
    let base = Utc.with_ymd_and_hms(2010, 3, 15, 12, 0, 0).unwrap();
    let times: Vec<DateTime<Utc>> = (0..3).map(|h| base + Duration::hours(h)).collect();

    let data = synthetic_data(times.clone(), vec![1000.0], vec![52.0], vec![0.0]);
    let window = Window::new(52.0, 2.0, 0.0, 2.0).unwrap();
    let template =
        OutputTemplate::new(dir.path().join("{timestamp}.dat").to_string_lossy().to_string());
    TileSerializer::new(&data, &window, &template)
        .write_all()
        .unwrap();

    // Unrelated and malformed files must not disturb the scan
    fs::write(dir.path().join("notes.txt"), "not a tile").unwrap();
    fs::write(dir.path().join("broken.dat"), "# comment only\n").unwrap();

    let latest = latest_tile_timestamp(dir.path()).unwrap();
    assert_eq!(latest, Some(datetime_to_posix(times[2])));
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    assert_eq!(latest_tile_timestamp(dir.path()).unwrap(), None);
}
