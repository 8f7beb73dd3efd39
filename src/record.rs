//! One measured timing of one strategy against one preset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single benchmark measurement.  Built once by the harness after a
/// successful run and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    implementation: String,
    preset_name: String,
    elapsed_seconds: f64,
    timestamp: DateTime<Utc>,
}

impl BenchmarkRecord {
    /// Creates a record.
    pub fn new(
        implementation: impl Into<String>,
        preset_name: impl Into<String>,
        elapsed_seconds: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        BenchmarkRecord {
            implementation: implementation.into(),
            preset_name: preset_name.into(),
            elapsed_seconds,
            timestamp,
        }
    }

    /// Name of the strategy that was timed.
    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    /// Name of the preset it was timed against.
    pub fn preset_name(&self) -> &str {
        &self.preset_name
    }

    /// Wall-clock time of the compute call alone.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// When the run finished.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
