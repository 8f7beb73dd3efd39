//! The finished product of every strategy: a row-major grid of
//! escape times, still attached to the preset that produced it.

use crate::error::{BenchError, Result};
use crate::planes::Pixel;
use crate::preset::Preset;

/// Reserves a zeroed, row-major buffer big enough for `preset`.
/// Running out of memory here is a compute failure, not an abort.
pub fn allocate(preset: &Preset) -> Result<Vec<u32>> {
    let len = preset
        .width()
        .checked_mul(preset.height())
        .ok_or_else(|| BenchError::Compute(format!("{} has too many pixels", preset.name())))?;
    let mut cells: Vec<u32> = Vec::new();
    cells.try_reserve_exact(len).map_err(|e| {
        BenchError::Compute(format!(
            "cannot allocate {} pixels for {}: {}",
            len,
            preset.name(),
            e
        ))
    })?;
    cells.resize(len, 0);
    Ok(cells)
}

/// Escape times for every pixel of a preset, one `u32` per pixel, in
/// row-major order.  Every value lies in `[0, max_iterations]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelGrid {
    preset: Preset,
    cells: Vec<u32>,
}

impl PixelGrid {
    /// Wraps a completed buffer.  The buffer must be exactly the size
    /// of the preset's grid.
    pub fn new(preset: &Preset, cells: Vec<u32>) -> Result<Self> {
        if cells.len() != preset.pixel_count() {
            return Err(BenchError::Compute(format!(
                "grid for {} has {} cells, expected {}",
                preset.name(),
                cells.len(),
                preset.pixel_count()
            )));
        }
        Ok(PixelGrid {
            preset: preset.clone(),
            cells,
        })
    }

    /// The preset this grid was computed for, and so its bounds.
    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.preset.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.preset.height()
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// One row of cells.  Panics if `row` is out of range, like
    /// slice indexing.
    pub fn row(&self, row: usize) -> &[u32] {
        let width = self.width();
        &self.cells[row * width..(row + 1) * width]
    }

    /// Iterates the rows top to bottom.
    pub fn rows(&self) -> std::slice::Chunks<'_, u32> {
        self.cells.chunks(self.width())
    }

    /// The escape time at a column and row, if they are on the grid.
    pub fn get(&self, column: usize, row: usize) -> Option<u32> {
        self.preset
            .planes()
            .pixel_to_offset(&Pixel(column, row))
            .map(|offset| self.cells[offset])
    }

    /// Number of pixels that never escaped.
    pub fn interior_count(&self) -> usize {
        let cap = self.preset.max_iterations();
        self.cells.iter().filter(|&&n| n == cap).count()
    }

    /// Hands the raw buffer over to a renderer.
    pub fn into_cells(self) -> Vec<u32> {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Complex;

    fn tiny() -> Preset {
        Preset::new("tiny", 3, 2, Complex::new(-2.0, -1.0), Complex::new(1.0, 1.0), 10).unwrap()
    }

    #[test]
    fn allocate_is_zeroed_and_sized() {
        let cells = allocate(&tiny()).unwrap();
        assert_eq!(cells, vec![0; 6]);
    }

    #[test]
    fn new_rejects_wrong_sized_buffers() {
        assert!(PixelGrid::new(&tiny(), vec![0; 5]).is_err());
        assert!(PixelGrid::new(&tiny(), vec![0; 6]).is_ok());
    }

    #[test]
    fn accessors_are_row_major() {
        let grid = PixelGrid::new(&tiny(), vec![1, 2, 3, 4, 5, 10]).unwrap();
        assert_eq!(grid.row(0), &[1, 2, 3]);
        assert_eq!(grid.row(1), &[4, 5, 10]);
        assert_eq!(grid.get(2, 0), Some(3));
        assert_eq!(grid.get(0, 1), Some(4));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
        assert_eq!(grid.rows().count(), 2);
        assert_eq!(grid.interior_count(), 1);
        assert_eq!(grid.preset().name(), "tiny");
    }
}
