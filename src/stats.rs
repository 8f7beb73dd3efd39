//! Summaries of the results log: per (strategy, preset) counts and
//! timings, ranked fastest first within each preset.

use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::preset::PRESET_ORDER;
use crate::record::BenchmarkRecord;
use crate::results::ResultsLog;

/// Timing summary for one strategy on one preset.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateStat {
    /// Strategy name.
    pub implementation: String,
    /// Preset name.
    pub preset_name: String,
    /// Number of runs.
    pub count: usize,
    /// Mean elapsed seconds.
    pub mean: f64,
    /// Fastest run.
    pub min: f64,
    /// Slowest run.
    pub max: f64,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    total: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn add(&mut self, seconds: f64) {
        if self.count == 0 {
            self.min = seconds;
            self.max = seconds;
        } else {
            self.min = self.min.min(seconds);
            self.max = self.max.max(seconds);
        }
        self.count += 1;
        self.total += seconds;
    }
}

// Catalog presets first, in catalog order, then everything else
// alphabetically.
fn preset_rank(name: &str) -> (usize, &str) {
    let position = PRESET_ORDER
        .iter()
        .position(|p| *p == name)
        .unwrap_or(PRESET_ORDER.len());
    (position, name)
}

fn ranking(a: &AggregateStat, b: &AggregateStat) -> Ordering {
    preset_rank(&a.preset_name)
        .cmp(&preset_rank(&b.preset_name))
        .then_with(|| a.mean.partial_cmp(&b.mean).unwrap_or(Ordering::Equal))
        .then_with(|| a.implementation.cmp(&b.implementation))
}

/// Every aggregate from a set of records, ranked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    stats: Vec<AggregateStat>,
}

/// Groups records by (implementation, preset) and ranks the groups.
/// No records means an empty summary.
pub fn aggregate<I>(records: I) -> Summary
where
    I: IntoIterator<Item = BenchmarkRecord>,
{
    let mut groups: BTreeMap<(String, String), Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry((
                record.implementation().to_string(),
                record.preset_name().to_string(),
            ))
            .or_insert_with(Accumulator::default)
            .add(record.elapsed_seconds());
    }

    let mut stats: Vec<AggregateStat> = groups
        .into_iter()
        .map(|((implementation, preset_name), acc)| AggregateStat {
            implementation,
            preset_name,
            count: acc.count,
            mean: acc.total / acc.count as f64,
            min: acc.min,
            max: acc.max,
        })
        .collect();
    stats.sort_by(ranking);
    Summary { stats }
}

impl Summary {
    /// Replays the log and summarizes it.
    pub fn from_log(log: &ResultsLog) -> Result<Self> {
        let records = log.records()?.collect::<Result<Vec<_>>>()?;
        Ok(aggregate(records))
    }

    /// All aggregates: presets in report order, fastest mean first
    /// within each, ties broken by strategy name.
    pub fn ranked(&self) -> &[AggregateStat] {
        &self.stats
    }

    /// True when there was nothing to summarize.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// The ranked aggregates for a single preset.
    pub fn for_preset(&self, preset_name: &str) -> Vec<&AggregateStat> {
        self.stats
            .iter()
            .filter(|s| s.preset_name == preset_name)
            .collect()
    }

    /// The preset names present, in report order.
    pub fn presets(&self) -> Vec<&str> {
        self.stats
            .iter()
            .map(|s| s.preset_name.as_str())
            .dedup()
            .collect()
    }
}

const COL_RANK: usize = 5;
const COL_NAME: usize = 30;
const COL_TIME: usize = 14;
const COL_RUNS: usize = 6;

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.stats.is_empty() {
            return writeln!(f, "No benchmark records found.");
        }
        let rule = COL_RANK + COL_NAME + 3 * COL_TIME + COL_RUNS + 5;
        for (preset, group) in &self.stats.iter().group_by(|s| s.preset_name.clone()) {
            writeln!(f)?;
            let title = format!(" Mandelbrot Benchmark Summary ({}) ", preset);
            writeln!(f, "{:=^width$}", title, width = rule)?;
            writeln!(
                f,
                "{:<rank$} {:<name$} {:>time$} {:>time$} {:>time$} {:>runs$}",
                "Rank",
                "Strategy",
                "Avg Time (s)",
                "Min (s)",
                "Max (s)",
                "Runs",
                rank = COL_RANK,
                name = COL_NAME,
                time = COL_TIME,
                runs = COL_RUNS
            )?;
            writeln!(f, "{}", "-".repeat(rule))?;
            for (i, stat) in group.enumerate() {
                writeln!(
                    f,
                    "{:<rank$} {:<name$} {:>time$.4} {:>time$.4} {:>time$.4} {:>runs$}",
                    i + 1,
                    stat.implementation,
                    stat.mean,
                    stat.min,
                    stat.max,
                    stat.count,
                    rank = COL_RANK,
                    name = COL_NAME,
                    time = COL_TIME,
                    runs = COL_RUNS
                )?;
            }
            writeln!(f, "{}", "=".repeat(rule))?;
        }
        Ok(())
    }
}
