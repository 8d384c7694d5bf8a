//! Shared instrumentation for the Ponte crates.

pub mod memory;

pub use memory::{
    capture_rss_bytes, rss_delta, MeasurementRecorder, MemoryError, StageMeasurement, StageStart,
};
