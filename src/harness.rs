//! The timing harness.  `time_once` is the measurement itself: one
//! compute call between two clock reads with nothing else inside the
//! window.  `Harness` drives it for named strategies, one run at a
//! time, and files every record in the results log.

use chrono::Utc;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{BenchError, Result};
use crate::grid::PixelGrid;
use crate::preset::Preset;
use crate::record::BenchmarkRecord;
use crate::results::ResultsLog;
use crate::strategy::{Strategy, StrategyRegistry};

/// Times a single compute call.  Nothing is logged or written; the
/// grid is handed back so the caller can check or render it.
pub fn time_once(strategy: &Strategy, preset: &Preset) -> Result<(BenchmarkRecord, PixelGrid)> {
    let start = Instant::now();
    let grid = strategy.compute(preset);
    let elapsed = start.elapsed();
    let grid = grid?;
    let record = BenchmarkRecord::new(
        strategy.name(),
        preset.name(),
        elapsed.as_secs_f64(),
        Utc::now(),
    );
    Ok((record, grid))
}

/// What one harness run produced.  A failed append leaves the record
/// intact next to the error so the caller can retry it.
#[derive(Debug)]
pub struct RunOutcome {
    /// The measurement.
    pub record: BenchmarkRecord,
    /// Pixels that never escaped, as a cheap fingerprint of the grid.
    pub interior: usize,
    /// Set when the record could not be appended to the log.
    pub log_error: Option<BenchError>,
}

/// Sequential benchmark driver over a registry and a results log.
#[derive(Debug)]
pub struct Harness<'a> {
    registry: &'a StrategyRegistry,
    log: &'a ResultsLog,
    sequencer: Mutex<()>,
}

impl<'a> Harness<'a> {
    /// A harness that looks strategies up in `registry` and appends to
    /// `log`.
    pub fn new(registry: &'a StrategyRegistry, log: &'a ResultsLog) -> Self {
        Harness {
            registry,
            log,
            sequencer: Mutex::new(()),
        }
    }

    /// The strategies this harness can run.
    pub fn registry(&self) -> &StrategyRegistry {
        self.registry
    }

    /// Times `strategy` on `preset` once and appends the record.
    /// Timed runs on the same harness never overlap, even when it is
    /// shared between threads, so they don't compete for cores.
    pub fn run(&self, strategy: &str, preset: &Preset) -> Result<RunOutcome> {
        let strategy = self.registry.get(strategy)?;
        let (record, grid) = {
            let _turn = self.sequencer.lock().unwrap_or_else(PoisonError::into_inner);
            time_once(strategy, preset)?
        };
        let interior = grid.interior_count();
        drop(grid);

        info!(
            implementation = record.implementation(),
            preset = record.preset_name(),
            elapsed_seconds = record.elapsed_seconds(),
            interior,
            "timed run complete"
        );

        let log_error = match self.log.append(&record) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "benchmark record was not logged");
                Some(e)
            }
        };
        Ok(RunOutcome {
            record,
            interior,
            log_error,
        })
    }

    /// Runs `strategy` on `preset` `repeat` times, one after another.
    /// Stops at the first compute failure; log failures are carried
    /// in the outcomes.
    pub fn run_repeated(
        &self,
        strategy: &str,
        preset: &Preset,
        repeat: usize,
    ) -> Result<Vec<RunOutcome>> {
        (0..repeat).map(|_| self.run(strategy, preset)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Complex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    fn small() -> Preset {
        Preset::new("small", 16, 12, Complex::new(-2.0, -1.0), Complex::new(1.0, 1.0), 40).unwrap()
    }

    #[test]
    fn time_once_names_the_record_after_its_inputs() {
        let registry = StrategyRegistry::builtin(2).unwrap();
        let (record, grid) = time_once(registry.get("tiled").unwrap(), &small()).unwrap();
        assert_eq!(record.implementation(), "tiled");
        assert_eq!(record.preset_name(), "small");
        assert!(record.elapsed_seconds() >= 0.0);
        assert_eq!(grid.cells().len(), 16 * 12);
    }

    #[test]
    fn time_once_measures_the_compute_call() {
        let slow = Strategy::new("sleepy", |preset: &Preset| {
            thread::sleep(Duration::from_millis(30));
            PixelGrid::new(preset, vec![1; preset.pixel_count()])
        });
        let (record, _) = time_once(&slow, &small()).unwrap();
        assert!(record.elapsed_seconds() >= 0.03);
    }

    #[test]
    fn compute_failures_produce_no_record() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::open(dir.path().join("bench.log"));
        let mut registry = StrategyRegistry::new();
        registry.register(Strategy::new("broken", |_| {
            Err(BenchError::Compute("out of memory".to_string()))
        }));
        let harness = Harness::new(&registry, &log);
        assert!(harness.run("broken", &small()).is_err());
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn runs_are_appended_in_order() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::open(dir.path().join("bench.log"));
        let registry = StrategyRegistry::builtin(2).unwrap();
        let harness = Harness::new(&registry, &log);
        let outcomes = harness.run_repeated("serial", &small(), 3).unwrap();
        harness.run("row-queue", &small()).unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.log_error.is_none()));

        let names: Vec<String> = log
            .read_all()
            .unwrap()
            .iter()
            .map(|r| r.implementation().to_string())
            .collect();
        assert_eq!(names, vec!["serial", "serial", "serial", "row-queue"]);
    }

    #[test]
    fn a_failed_append_keeps_the_record() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::open(dir.path());
        let registry = StrategyRegistry::builtin(1).unwrap();
        let harness = Harness::new(&registry, &log);
        let outcome = harness.run("serial", &small()).unwrap();
        assert_eq!(outcome.record.implementation(), "serial");
        let error = outcome.log_error.expect("append into a directory should fail");
        assert!(error.is_retryable());

        let retry = ResultsLog::open(dir.path().join("retry.log"));
        retry.append(&outcome.record).unwrap();
        assert_eq!(retry.read_all().unwrap(), vec![outcome.record]);
    }

    #[test]
    fn timed_runs_never_overlap() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::open(dir.path().join("bench.log"));
        let active = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let mut registry = StrategyRegistry::new();
        {
            let active = active.clone();
            let overlaps = overlaps.clone();
            registry.register(Strategy::new("watched", move |preset: &Preset| {
                if active.fetch_add(1, Ordering::SeqCst) > 0 {
                    overlaps.fetch_add(1, Ordering::SeqCst);
                }
                thread::sleep(Duration::from_millis(5));
                active.fetch_sub(1, Ordering::SeqCst);
                PixelGrid::new(preset, vec![0; preset.pixel_count()])
            }));
        }
        let harness = Harness::new(&registry, &log);
        let preset = small();
        crossbeam::scope(|s| {
            for _ in 0..4 {
                s.spawn(|_| harness.run_repeated("watched", &preset, 3).unwrap());
            }
        })
        .unwrap();
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(log.read_all().unwrap().len(), 12);
    }
}
