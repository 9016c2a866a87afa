//! Dataset discovery by candidate enumeration
//!
//! The model publishes one dataset per synoptic run. Given a target instant,
//! discovery walks a finite, reverse-chronological sequence of run
//! identifiers and returns the first whose declared time axis covers the
//! target. Each candidate is tried exactly once; a per-candidate open or
//! axis failure only advances the enumeration.

use crate::data_source::{GridDataset, GridSource};
use crate::errors::{Result, WindTileError};
use crate::time::axis_value_to_datetime;
use chrono::{DateTime, Datelike, Duration, Utc};
use log::{debug, info};

/// Lookback period over which candidate runs are enumerated.
const LOOKBACK_HOURS: i64 = 180; // 7.5 days

/// Daily synoptic cycles, latest first.
const CYCLES: [u32; 4] = [18, 12, 6, 0];

/// One candidate model run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRun {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Synoptic cycle hour: 0, 6, 12 or 18.
    pub cycle: u32,
}

impl ModelRun {
    /// Dataset identifier relative to the source base URL.
    pub fn dataset_id(&self) -> String {
        format!(
            "gfs_hd{:04}{:02}{:02}/gfs_hd_{:02}z",
            self.year, self.month, self.day, self.cycle
        )
    }
}

/// Lazy, finite, restartable sequence of candidate runs for a target
/// instant: one day at a time backwards over the lookback period, the four
/// synoptic cycles within each day from latest to earliest.
#[derive(Debug, Clone)]
pub struct CandidateRuns {
    proposed: DateTime<Utc>,
    earliest: DateTime<Utc>,
    next_cycle: usize,
}

impl CandidateRuns {
    pub fn new(target: DateTime<Utc>) -> Self {
        Self {
            proposed: target,
            earliest: target - Duration::hours(LOOKBACK_HOURS),
            next_cycle: 0,
        }
    }
}

impl Iterator for CandidateRuns {
    type Item = ModelRun;

    fn next(&mut self) -> Option<ModelRun> {
        if self.proposed < self.earliest {
            return None;
        }

        let run = ModelRun {
            year: self.proposed.year(),
            month: self.proposed.month(),
            day: self.proposed.day(),
            cycle: CYCLES[self.next_cycle],
        };

        self.next_cycle += 1;
        if self.next_cycle == CYCLES.len() {
            self.next_cycle = 0;
            self.proposed = self.proposed - Duration::days(1);
        }

        Some(run)
    }
}

/// A located dataset together with the identifier that produced it.
pub struct LocatedDataset {
    pub id: String,
    pub dataset: Box<dyn GridDataset>,
}

/// Finds the latest dataset whose declared time axis covers `target`.
///
/// Discovery-by-enumeration, not retry-on-failure: the candidate sequence is
/// consumed until one dataset matches or the sequence is exhausted.
pub fn locate_dataset(source: &dyn GridSource, target: DateTime<Utc>) -> Result<LocatedDataset> {
    let mut tried = 0;

    for run in CandidateRuns::new(target) {
        let id = run.dataset_id();
        tried += 1;

        let dataset = match source.open_dataset(&id) {
            Ok(dataset) => dataset,
            Err(e) => {
                debug!("candidate {} unavailable: {}", id, e);
                continue;
            }
        };

        match covers(dataset.as_ref(), target) {
            Ok(true) => {
                info!("found dataset {} covering {}", id, target);
                return Ok(LocatedDataset { id, dataset });
            }
            Ok(false) => debug!("candidate {} does not cover {}", id, target),
            Err(e) => debug!("candidate {} has unusable time axis: {}", id, e),
        }
    }

    Err(WindTileError::DatasetNotFound {
        target: target.to_rfc3339(),
        tried,
    })
}

/// Whether the dataset's declared time bounds fully contain `target`.
fn covers(dataset: &dyn GridDataset, target: DateTime<Utc>) -> Result<bool> {
    let axis = dataset.time_axis()?;
    let (first, last) = match (axis.first(), axis.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Ok(false),
    };

    let start = axis_value_to_datetime(first)?;
    let end = axis_value_to_datetime(last)?;
    Ok(start <= target && end >= target)
}
