//! The row-queue renderer.  Rather than cutting the grid into fixed
//! tiles up front, every worker pulls the next unclaimed row from a
//! shared iterator until the rows run out, so fast rows and slow rows
//! even out across threads.  Each row handed out is a disjoint slice
//! of the output buffer; the lock only guards the hand-out.

use crossbeam::thread::ScopedJoinHandle;
use std::iter::Enumerate;
use std::slice::ChunksMut;
use std::sync::{Arc, Mutex};

use crate::error::{BenchError, Result};
use crate::escape::render_rows;
use crate::grid::{self, PixelGrid};
use crate::preset::Preset;

type RowQueue<'a> = Arc<Mutex<Enumerate<ChunksMut<'a, u32>>>>;

/// Renders a preset with `threads` workers pulling rows from a queue.
pub fn render_row_queue(preset: &Preset, threads: usize) -> Result<PixelGrid> {
    if threads == 0 {
        return Err(BenchError::Configuration(
            "the row queue needs at least one worker".to_string(),
        ));
    }
    let mut cells = grid::allocate(preset)?;
    let planes = preset.planes();
    let max_iterations = preset.max_iterations();

    let joined = crossbeam::scope(|spawner| {
        let rows: RowQueue = Arc::new(Mutex::new(cells.chunks_mut(preset.width()).enumerate()));
        let handles: Vec<ScopedJoinHandle<Result<usize>>> = (0..threads.min(preset.height()))
            .map(|_| {
                let rows = rows.clone();
                spawner.spawn(move |_| {
                    let mut done = 0;
                    loop {
                        let next = {
                            let mut queue = rows.lock().map_err(|_| {
                                BenchError::Compute("row queue lock poisoned".to_string())
                            })?;
                            queue.next()
                        };
                        match next {
                            Some((row, band)) => {
                                render_rows(planes, max_iterations, row, band);
                                done += 1;
                            }
                            None => {
                                break;
                            }
                        }
                    }
                    Ok(done)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| BenchError::Compute("row worker panicked".to_string()))
                    .and_then(|rows| rows)
            })
            .collect::<Result<Vec<usize>>>()
    });

    let rendered: usize = joined
        .map_err(|_| BenchError::Compute("worker scope panicked".to_string()))??
        .iter()
        .sum();
    if rendered != preset.height() {
        return Err(BenchError::Compute(format!(
            "row queue rendered {} of {} rows",
            rendered,
            preset.height()
        )));
    }
    PixelGrid::new(preset, cells)
}
