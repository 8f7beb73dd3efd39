//! Strategies are the things being benchmarked: anything that can
//! turn a `Preset` into a `PixelGrid`.  The harness only ever sees
//! them through `Strategy::compute`, so a new approach is a closure
//! and a name, nothing more.

use std::fmt;

use crate::error::{BenchError, Result};
use crate::escape::render_rows;
use crate::grid::{self, PixelGrid};
use crate::preset::Preset;
use crate::queue::render_row_queue;
use crate::tiles::TileScheduler;

/// The capability every strategy provides.
pub type ComputeFn = Box<dyn Fn(&Preset) -> Result<PixelGrid> + Send + Sync>;

/// A named way of computing a grid.
pub struct Strategy {
    name: String,
    compute: ComputeFn,
}

impl Strategy {
    /// Wraps a compute function under a name.
    pub fn new<F>(name: &str, compute: F) -> Self
    where
        F: Fn(&Preset) -> Result<PixelGrid> + Send + Sync + 'static,
    {
        Strategy {
            name: name.to_string(),
            compute: Box::new(compute),
        }
    }

    /// The name records are filed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the strategy once.
    pub fn compute(&self, preset: &Preset) -> Result<PixelGrid> {
        (self.compute)(preset)
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// The baseline: one thread, every row in order.
pub fn render_serial(preset: &Preset) -> Result<PixelGrid> {
    let mut cells = grid::allocate(preset)?;
    render_rows(preset.planes(), preset.max_iterations(), 0, &mut cells);
    PixelGrid::new(preset, cells)
}

/// Strategies by name, in registration order.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    strategies: Vec<Strategy>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        StrategyRegistry::default()
    }

    /// The built-in CPU strategies, with `workers` threads for the
    /// parallel ones: `serial`, `tiled` and `row-queue`.
    pub fn builtin(workers: usize) -> Result<Self> {
        let scheduler = TileScheduler::new(workers)?;
        let mut registry = StrategyRegistry::new();
        registry.register(Strategy::new("serial", render_serial));
        registry.register(Strategy::new("tiled", move |preset| scheduler.render(preset)));
        registry.register(Strategy::new("row-queue", move |preset| {
            render_row_queue(preset, workers)
        }));
        Ok(registry)
    }

    /// Adds a strategy.  Registering a name twice replaces the
    /// earlier strategy in place, keeping its position.
    pub fn register(&mut self, strategy: Strategy) {
        match self
            .strategies
            .iter_mut()
            .find(|s| s.name() == strategy.name())
        {
            Some(existing) => *existing = strategy,
            None => self.strategies.push(strategy),
        }
    }

    /// Finds a strategy by name.
    pub fn get(&self, name: &str) -> Result<&Strategy> {
        self.strategies
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| BenchError::UnknownStrategy(name.to_string()))
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(Strategy::name).collect()
    }

    /// Iterates the strategies in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Strategy> {
        self.strategies.iter()
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
