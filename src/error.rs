// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error type shared by every stage of a benchmark, from preset
//! construction down to replaying the results log.

use failure::Fail;
use std::io;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Everything that can go wrong while building, computing, timing or
/// recording a Mandelbrot grid.
#[derive(Debug, Fail)]
pub enum BenchError {
    /// A preset or scheduler was described with values that cannot
    /// produce a grid.  Raised at construction and never clamped.
    #[fail(display = "configuration error: {}", _0)]
    Configuration(String),

    /// The grid could not be computed: allocation failed or a worker
    /// died.  No partial grid survives this.
    #[fail(display = "grid computation failed: {}", _0)]
    Compute(String),

    /// A record could not be appended to the results log.  The record
    /// itself is still valid and the append may be retried.
    #[fail(display = "could not append to results log {}: {}", path, source)]
    LogWrite {
        /// Location of the log.
        path: String,
        /// What the filesystem said.
        #[cause]
        source: io::Error,
    },

    /// The results log could not be opened or read back.
    #[fail(display = "could not read results log {}: {}", path, source)]
    LogRead {
        /// Location of the log.
        path: String,
        /// What the filesystem said.
        #[cause]
        source: io::Error,
    },

    /// No strategy is registered under this name.
    #[fail(display = "no strategy registered as '{}'", _0)]
    UnknownStrategy(String),

    /// No preset in the catalog has this name.
    #[fail(display = "no preset named '{}'", _0)]
    UnknownPreset(String),
}

impl BenchError {
    /// Log write failures are the only ones worth retrying; everything
    /// else would just repeat a full recomputation or a bad lookup.
    pub fn is_retryable(&self) -> bool {
        match self {
            BenchError::LogWrite { .. } => true,
            _ => false,
        }
    }
}
