//! Process memory instrumentation.
//!
//! The solve path and the bench runner record resident-set snapshots
//! around expensive stages and log the deltas.

use std::time::{Duration, Instant};
use sysinfo::System;

/// Errors produced by memory instrumentation.
#[derive(Debug, Clone)]
pub enum MemoryError {
    ProcessNotFound { pid: u32 },
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::ProcessNotFound { pid } => {
                write!(f, "failed to locate process {}", pid)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

fn current_rss_bytes() -> Result<u64, MemoryError> {
    let pid = sysinfo::Pid::from(std::process::id() as usize);

    // Refresh only our own process, not the whole system table.
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        sysinfo::ProcessesToUpdate::Some(&[pid]),
        true,
        sysinfo::ProcessRefreshKind::nothing().with_memory(),
    );

    let process = sys.process(pid).ok_or(MemoryError::ProcessNotFound {
        pid: std::process::id(),
    })?;
    Ok(process.memory())
}

/// Resident-set size of the current process, if it can be read.
pub fn capture_rss_bytes() -> Option<u64> {
    current_rss_bytes().ok()
}

/// RSS delta between two optional measurements (positive means growth).
pub fn rss_delta(before: Option<u64>, after: Option<u64>) -> Option<i64> {
    match (before, after) {
        (Some(before), Some(after)) => Some(after as i64 - before as i64),
        _ => None,
    }
}

/// Marker returned by [`MeasurementRecorder::begin_stage`].
#[derive(Debug, Clone)]
pub struct StageStart {
    stage: String,
    started_at: Instant,
    rss_before_bytes: Option<u64>,
}

/// Timing and memory data for one completed stage.
#[derive(Debug, Clone)]
pub struct StageMeasurement {
    pub stage: String,
    pub duration: Duration,
    pub rss_before_bytes: Option<u64>,
    pub rss_after_bytes: Option<u64>,
    pub rss_delta_bytes: Option<i64>,
}

/// Collects per-stage timing and memory measurements.
#[derive(Debug, Default)]
pub struct MeasurementRecorder {
    stages: Vec<StageMeasurement>,
}

impl MeasurementRecorder {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Capture stage start timing and memory.
    pub fn begin_stage(&self, stage: &str) -> StageStart {
        StageStart {
            stage: stage.to_string(),
            started_at: Instant::now(),
            rss_before_bytes: capture_rss_bytes(),
        }
    }

    /// Close a stage and append its measurement.
    pub fn end_stage(&mut self, start: StageStart) {
        let rss_after_bytes = capture_rss_bytes();
        self.stages.push(StageMeasurement {
            stage: start.stage,
            duration: start.started_at.elapsed(),
            rss_before_bytes: start.rss_before_bytes,
            rss_after_bytes,
            rss_delta_bytes: rss_delta(start.rss_before_bytes, rss_after_bytes),
        });
    }

    /// All measurements, in completion order.
    pub fn stages(&self) -> &[StageMeasurement] {
        &self.stages
    }
}
