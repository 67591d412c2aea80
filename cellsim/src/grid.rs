// grid.rs - Grid storage and the current/next buffer pair

use rand::Rng;

use crate::error::{Result, SimError};
use crate::patterns::Pattern;

/// A single cell value.
///
/// Integer rules only ever write whole numbers, but the blur rule produces
/// fractional averages, and those must survive a later switch to another rule.
pub type Cell = f64;

/// A `rows x cols` array of cells stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid filled with state 0.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(SimError::InvalidDimension { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(SimError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Reads a cell.
    pub fn get(&self, row: usize, col: usize) -> Result<Cell> {
        let index = self.index(row, col)?;
        Ok(self.cells[index])
    }

    /// Writes a cell. The value is stored as given, without clamping.
    pub fn set(&mut self, row: usize, col: usize, value: Cell) -> Result<()> {
        let index = self.index(row, col)?;
        self.cells[index] = value;
        Ok(())
    }

    /// Unchecked read for coordinates already reduced into range.
    pub(crate) fn at(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    pub fn fill(&mut self, value: Cell) {
        self.cells.fill(value);
    }

    pub fn clear(&mut self) {
        self.fill(0.0);
    }

    /// Sets every cell to an independent uniform integer in `[0, total_states - 1]`.
    pub fn randomize<R: Rng>(&mut self, total_states: u32, rng: &mut R) {
        let total_states = total_states.max(1);
        for cell in &mut self.cells {
            *cell = f64::from(rng.gen_range(0..total_states));
        }
    }

    /// Writes state 1 at each pattern offset relative to `(top, left)`, wrapping at the edges.
    ///
    /// The anchor itself wraps too, so any `(top, left)` is accepted.
    pub fn stamp(&mut self, pattern: &Pattern, top: usize, left: usize) {
        let (top, left) = (top % self.rows, left % self.cols);
        for &(dr, dc) in pattern.cells {
            let row = (top + dr % self.rows) % self.rows;
            let col = (left + dc % self.cols) % self.cols;
            self.cells[row * self.cols + col] = 1.0;
        }
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }

    /// Number of non-zero cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0.0).count()
    }
}

/// The double-buffer pair.
///
/// `next` is only ever written through [`GridState::advance`], which
/// overwrites every cell before swapping, so no value from two generations
/// back can leak into the new current grid.
#[derive(Debug, Clone)]
pub struct GridState {
    current: Grid,
    next: Grid,
}

impl GridState {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self {
            current: Grid::new(rows, cols)?,
            next: Grid::new(rows, cols)?,
        })
    }

    /// Replaces both buffers. All prior cell data is lost.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        *self = Self::new(rows, cols)?;
        Ok(())
    }

    /// The visible generation.
    pub fn current(&self) -> &Grid {
        &self.current
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.current.dimensions()
    }

    pub fn get_cell(&self, row: usize, col: usize) -> Result<Cell> {
        self.current.get(row, col)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) -> Result<()> {
        self.current.set(row, col, value)
    }

    pub fn clear(&mut self) {
        self.current.clear();
    }

    pub fn randomize<R: Rng>(&mut self, total_states: u32, rng: &mut R) {
        self.current.randomize(total_states, rng);
    }

    pub fn stamp(&mut self, pattern: &Pattern, top: usize, left: usize) {
        self.current.stamp(pattern, top, left);
    }

    /// Computes every cell of `next` from `current` in row-major order, then swaps.
    pub(crate) fn advance<F>(&mut self, mut rule: F)
    where
        F: FnMut(&Grid, usize, usize) -> Cell,
    {
        let cols = self.current.cols;
        for (index, slot) in self.next.cells.iter_mut().enumerate() {
            *slot = rule(&self.current, index / cols, index % cols);
        }
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_new_grid_is_zeroed() {
        let grid = Grid::new(4, 6).unwrap();
        assert_eq!(grid.dimensions(), (4, 6));
        assert!(grid.cells().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert_eq!(
            Grid::new(0, 5),
            Err(SimError::InvalidDimension { rows: 0, cols: 5 })
        );
        assert!(GridState::new(3, 0).is_err());
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut grid = Grid::new(3, 3).unwrap();
        assert!(matches!(
            grid.get(3, 0),
            Err(SimError::OutOfBounds { row: 3, col: 0, .. })
        ));
        assert!(grid.set(0, 7, 1.0).is_err());
    }

    #[test]
    fn test_set_does_not_clamp() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.set(1, 1, 42.0).unwrap();
        assert_eq!(grid.get(1, 1).unwrap(), 42.0);
    }

    #[test]
    fn test_randomize_stays_in_range() {
        let mut grid = Grid::new(20, 20).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        grid.randomize(7, &mut rng);
        assert!(grid.cells().iter().all(|&v| (0.0..7.0).contains(&v) && v.fract() == 0.0));
        // 400 draws over 7 states should hit more than one value
        assert!(grid.cells().iter().any(|&v| v != grid.cells()[0]));
    }

    #[test]
    fn test_advance_overwrites_next_and_swaps() {
        let mut state = GridState::new(2, 3).unwrap();
        state.set_cell(0, 0, 5.0).unwrap();

        state.advance(|grid, row, col| grid.at(row, col) + (row * 3 + col) as f64);
        assert_eq!(state.get_cell(0, 0).unwrap(), 5.0);
        assert_eq!(state.get_cell(1, 2).unwrap(), 5.0);

        // The old current (now next) held 5.0 at (0,0); it must be fully replaced.
        state.advance(|_, _, _| 1.0);
        assert!(state.current().cells().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_resize_discards_cells() {
        let mut state = GridState::new(3, 3).unwrap();
        state.set_cell(1, 1, 1.0).unwrap();
        state.resize(5, 4).unwrap();
        assert_eq!(state.dimensions(), (5, 4));
        assert_eq!(state.current().population(), 0);
    }

    #[test]
    fn test_stamp_wraps_any_anchor() {
        let glider = crate::patterns::GLIDER;
        let mut at_origin = Grid::new(5, 5).unwrap();
        at_origin.stamp(&glider, 0, 0);

        // usize::MAX is a multiple of 5, so this lands on the origin too.
        let mut far = Grid::new(5, 5).unwrap();
        far.stamp(&glider, usize::MAX, usize::MAX);
        assert_eq!(far, at_origin);

        let mut wrapped = Grid::new(5, 5).unwrap();
        wrapped.stamp(&glider, 7, 12);
        assert_eq!(wrapped.get(2, 3).unwrap(), 1.0);
        assert_eq!(wrapped.get(4, 4).unwrap(), 1.0);
        assert_eq!(wrapped.get(4, 2).unwrap(), 1.0);
        assert_eq!(wrapped.population(), 5);
    }

    #[test]
    fn test_iter_rows() {
        let mut grid = Grid::new(2, 3).unwrap();
        grid.set(1, 0, 2.0).unwrap();
        let rows: Vec<&[Cell]> = grid.iter_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], &[2.0, 0.0, 0.0]);
    }
}
