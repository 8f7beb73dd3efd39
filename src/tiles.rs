// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The tiling scheduler.  The grid is cut into horizontal bands of
//! whole rows, one per worker, before any thread starts; each worker
//! gets exclusive ownership of its band's slice of the output buffer,
//! so the only synchronization in the whole computation is the final
//! join.

use crossbeam::thread::ScopedJoinHandle;
use std::mem;

use crate::error::{BenchError, Result};
use crate::escape::render_rows;
use crate::grid::{self, PixelGrid};
use crate::preset::Preset;

/// A band of rows, `[row_start, row_end)`, spanning the full width
/// of the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    /// First row of the band.
    pub row_start: usize,
    /// One past the last row of the band.
    pub row_end: usize,
    /// Width of the grid, and so of every row in the band.
    pub width: usize,
}

impl Tile {
    /// Rows in this tile.
    pub fn rows(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Pixels in this tile.
    pub fn pixel_count(&self) -> usize {
        self.rows() * self.width
    }
}

/// Splits `height` rows into `min(workers, height)` tiles.  When the
/// rows don't divide evenly the first `height % tiles` tiles take one
/// extra row each, so no two tiles differ by more than a row.
pub fn partition(width: usize, height: usize, workers: usize) -> Vec<Tile> {
    let count = workers.min(height).max(1);
    let base = height / count;
    let extra = height % count;
    let mut row_start = 0;
    (0..count)
        .map(|i| {
            let rows = if i < extra { base + 1 } else { base };
            let tile = Tile {
                row_start,
                row_end: row_start + rows,
                width,
            };
            row_start += rows;
            tile
        })
        .collect()
}

/// Runs `work` once per tile, each on its own scoped thread, handing
/// every call the slice of `cells` that belongs to its tile.  Returns
/// once every worker has been joined.  If any of them panicked the
/// whole call fails.
pub fn fork_join<F>(tiles: &[Tile], cells: &mut [u32], work: F) -> Result<()>
where
    F: Fn(&Tile, &mut [u32]) + Sync,
{
    let expected: usize = tiles.iter().map(Tile::pixel_count).sum();
    if expected != cells.len() {
        return Err(BenchError::Compute(format!(
            "tiles cover {} pixels but the grid has {}",
            expected,
            cells.len()
        )));
    }

    let work = &work;
    let joined = crossbeam::scope(|spawner| {
        let mut rest: &mut [u32] = cells;
        let handles: Vec<ScopedJoinHandle<()>> = tiles
            .iter()
            .map(|tile| {
                let (region, tail) = mem::take(&mut rest).split_at_mut(tile.pixel_count());
                rest = tail;
                spawner.spawn(move |_| work(tile, region))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(|joined| joined.is_err())
            .count()
    });

    match joined {
        Ok(0) => Ok(()),
        Ok(failed) => Err(BenchError::Compute(format!(
            "{} of {} workers failed",
            failed,
            tiles.len()
        ))),
        Err(_) => Err(BenchError::Compute("worker scope panicked".to_string())),
    }
}

/// Computes whole grids by spreading row tiles over a fixed number of
/// scoped worker threads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileScheduler {
    workers: usize,
}

impl Default for TileScheduler {
    /// One worker per logical CPU.
    fn default() -> Self {
        TileScheduler {
            workers: num_cpus::get().max(1),
        }
    }
}

impl TileScheduler {
    /// A scheduler with an explicit worker count, which must be at
    /// least one.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(BenchError::Configuration(
                "the tiling scheduler needs at least one worker".to_string(),
            ));
        }
        Ok(TileScheduler { workers })
    }

    /// Number of workers this scheduler dispatches, before clamping
    /// to the grid height.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The tiles this scheduler would use for `preset`.
    pub fn tiles(&self, preset: &Preset) -> Vec<Tile> {
        partition(preset.width(), preset.height(), self.workers)
    }

    /// Computes the full grid for `preset`.  Either every tile
    /// finishes and the grid is returned, or nothing is.
    pub fn render(&self, preset: &Preset) -> Result<PixelGrid> {
        let tiles = self.tiles(preset);
        let mut cells = grid::allocate(preset)?;
        let planes = preset.planes();
        let max_iterations = preset.max_iterations();
        fork_join(&tiles, &mut cells, |tile, region| {
            render_rows(planes, max_iterations, tile.row_start, region)
        })?;
        PixelGrid::new(preset, cells)
    }
}
