//! # Latency recorder
//!
//! Collects the processing time of every cycle that worked on sensor-stamped data, along with
//! the age of that sensor data at the end of the cycle, and logs a summary of both every
//! `report_every` records.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Accumulates latency records and reports them periodically.
#[derive(Debug, Clone)]
pub struct LatencyRecorder {
    name: String,
    report_every: usize,
    processing_ms: Vec<f64>,
    sensor_age_ms: Vec<f64>,
    last_summary: Option<LatencySummary>,
}

/// Statistics over a batch of records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySummary {
    pub num_records: usize,

    pub processing_min_ms: f64,
    pub processing_mean_ms: f64,
    pub processing_max_ms: f64,

    pub sensor_age_min_ms: f64,
    pub sensor_age_mean_ms: f64,
    pub sensor_age_max_ms: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LatencyRecorder {
    /// Create a recorder which reports every `report_every` records (at least one).
    pub fn new(name: &str, report_every: usize) -> Self {
        Self {
            name: name.to_string(),
            report_every: report_every.max(1),
            processing_ms: Vec::with_capacity(report_every),
            sensor_age_ms: Vec::with_capacity(report_every),
            last_summary: None,
        }
    }

    /// Append the record of one cycle.
    ///
    /// # Inputs
    /// - `sensor_timestamp_ns`: timestamp of the sensor data the cycle worked on, nanoseconds
    ///   since the unix epoch
    /// - `start_s`, `end_s`: start and end of the cycle, seconds since the unix epoch
    ///
    /// Returns the summary if this record completed a batch.
    pub fn append(
        &mut self,
        sensor_timestamp_ns: u64,
        start_s: f64,
        end_s: f64,
    ) -> Option<LatencySummary> {
        let sensor_s = sensor_timestamp_ns as f64 * 1e-9;

        self.processing_ms.push((end_s - start_s) * 1e3);
        self.sensor_age_ms.push((end_s - sensor_s) * 1e3);

        if self.processing_ms.len() < self.report_every {
            return None;
        }

        let (processing_min_ms, processing_mean_ms, processing_max_ms) = stats(&self.processing_ms);
        let (sensor_age_min_ms, sensor_age_mean_ms, sensor_age_max_ms) = stats(&self.sensor_age_ms);

        let summary = LatencySummary {
            num_records: self.processing_ms.len(),
            processing_min_ms,
            processing_mean_ms,
            processing_max_ms,
            sensor_age_min_ms,
            sensor_age_mean_ms,
            sensor_age_max_ms,
        };

        debug!(
            "{} latency over {} cycles: processing {:.03}/{:.03}/{:.03} ms, \
            sensor age {:.03}/{:.03}/{:.03} ms (min/mean/max)",
            self.name,
            summary.num_records,
            summary.processing_min_ms,
            summary.processing_mean_ms,
            summary.processing_max_ms,
            summary.sensor_age_min_ms,
            summary.sensor_age_mean_ms,
            summary.sensor_age_max_ms
        );

        self.processing_ms.clear();
        self.sensor_age_ms.clear();
        self.last_summary = Some(summary);

        Some(summary)
    }

    /// The summary of the last completed batch.
    pub fn last_summary(&self) -> Option<LatencySummary> {
        self.last_summary
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Min, mean and max of a non-empty slice.
fn stats(values: &[f64]) -> (f64, f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    (min, mean, max)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
