#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot benchmark kit
//!
//! The Mandelbrot set is the set of points c on the complex plane for
//! which z = z² + c, iterated from zero, stays bounded.  Rendering it
//! means asking, for every pixel, how many iterations the orbit of the
//! point under that pixel takes to leave the circle of radius two:
//! its "escape time."  Points that never leave within a fixed cap are
//! taken to be inside the set.
//!
//! Every pixel is independent of every other, which makes the set a
//! natural yardstick for comparing ways of spreading work over cores.
//! This crate provides the kernel, a handful of strategies for driving
//! it over a grid (`serial`, `tiled`, `row-queue`), a harness that
//! times them one at a time against a fixed catalog of presets, an
//! append-only log for the timings, and a ranked summary of the log.

extern crate chrono;
extern crate crossbeam;
extern crate failure;
extern crate itertools;
extern crate num;
extern crate num_cpus;
extern crate serde;
extern crate serde_json;
extern crate tracing;

pub mod error;
pub mod escape;
pub mod grid;
pub mod harness;
pub mod planes;
pub mod preset;
pub mod queue;
pub mod record;
pub mod results;
pub mod stats;
pub mod strategy;
pub mod tiles;

pub use error::{BenchError, Result};
pub use escape::escape_time;
pub use grid::PixelGrid;
pub use harness::{time_once, Harness, RunOutcome};
pub use preset::{catalog, Preset, View};
pub use record::BenchmarkRecord;
pub use results::ResultsLog;
pub use stats::{aggregate, AggregateStat, Summary};
pub use strategy::{Strategy, StrategyRegistry};
pub use tiles::{Tile, TileScheduler};
