// neighborhood.rs - Per-cell aggregates over toroidal neighborhoods

use crate::grid::{Cell, Grid};

/// Moore neighborhood offsets, center excluded.
#[rustfmt::skip]
const MOORE: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// Which cell values count as "alive" when counting neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlivePredicate {
    /// Only the value 1 is alive.
    StrictlyOne,
    /// Any non-zero value is alive.
    NonZero,
}

impl AlivePredicate {
    pub fn matches(self, value: Cell) -> bool {
        match self {
            AlivePredicate::StrictlyOne => value == 1.0,
            AlivePredicate::NonZero => value != 0.0,
        }
    }
}

/// Read-only view over a grid that computes neighborhood statistics.
///
/// Every lookup wraps on both axes, so each cell always has exactly eight
/// Moore neighbors. On grids narrower than three cells some of those
/// neighbors are the same cell, or the center itself.
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood<'a> {
    grid: &'a Grid,
}

impl<'a> Neighborhood<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// The value at `(row, col)` itself.
    pub fn center(&self, row: usize, col: usize) -> Cell {
        self.grid.at(row, col)
    }

    fn wrapped(&self, row: usize, col: usize, dr: isize, dc: isize) -> Cell {
        let (rows, cols) = self.grid.dimensions();
        let r = (row as isize + dr).rem_euclid(rows as isize) as usize;
        let c = (col as isize + dc).rem_euclid(cols as isize) as usize;
        self.grid.at(r, c)
    }

    /// The eight Moore-neighbor values.
    pub fn moore(&self, row: usize, col: usize) -> impl Iterator<Item = Cell> + 'a {
        let hood = *self;
        MOORE
            .iter()
            .map(move |&(dr, dc)| hood.wrapped(row, col, dr, dc))
    }

    /// Number of Moore neighbors the predicate calls alive.
    pub fn count_alive(&self, row: usize, col: usize, predicate: AlivePredicate) -> u8 {
        self.moore(row, col).filter(|&v| predicate.matches(v)).count() as u8
    }

    /// Mean of the raw Moore-neighbor values.
    pub fn average(&self, row: usize, col: usize) -> f64 {
        self.moore(row, col).sum::<f64>() / MOORE.len() as f64
    }

    /// Number of Moore neighbors with `low < v < high`.
    pub fn count_in_range(&self, row: usize, col: usize, low: f64, high: f64) -> u8 {
        self.moore(row, col)
            .filter(|&v| v > low && v < high)
            .count() as u8
    }

    /// Sum over the `kernel_size x kernel_size` window centered on the cell, center included.
    ///
    /// The window radius is `kernel_size / 2`; windows wider than the grid wrap
    /// around more than once.
    pub fn windowed_sum(&self, row: usize, col: usize, kernel_size: usize) -> f64 {
        let half = (kernel_size / 2) as isize;
        let mut sum = 0.0;
        for dr in -half..=half {
            for dc in -half..=half {
                sum += self.wrapped(row, col, dr, dc);
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&[Cell]]) -> Grid {
        let mut grid = Grid::new(rows.len(), rows[0].len()).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                grid.set(r, c, v).unwrap();
            }
        }
        grid
    }

    #[test]
    fn test_count_alive_cross() {
        let grid = grid_from(&[
            &[0.0, 0.0, 0.0, 0.0, 0.0],
            &[0.0, 0.0, 1.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0, 0.0, 0.0],
        ]);
        let hood = Neighborhood::new(&grid);
        assert_eq!(hood.count_alive(2, 2, AlivePredicate::StrictlyOne), 4);
        assert_eq!(hood.count_alive(0, 0, AlivePredicate::StrictlyOne), 0);
    }

    #[test]
    fn test_wraparound_corner() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(4, 4, 1.0).unwrap();
        let hood = Neighborhood::new(&grid);
        assert_eq!(hood.count_alive(0, 0, AlivePredicate::StrictlyOne), 1);
        assert_eq!(hood.count_alive(4, 0, AlivePredicate::StrictlyOne), 1);
        assert_eq!(hood.count_alive(2, 2, AlivePredicate::StrictlyOne), 0);
    }

    #[test]
    fn test_predicates_differ_on_multi_state_values() {
        let grid = grid_from(&[
            &[2.0, 1.0, 0.0],
            &[0.0, 0.0, 0.0],
            &[0.5, 0.0, 3.0],
        ]);
        let hood = Neighborhood::new(&grid);
        assert_eq!(hood.count_alive(1, 1, AlivePredicate::StrictlyOne), 1);
        assert_eq!(hood.count_alive(1, 1, AlivePredicate::NonZero), 4);
    }

    #[test]
    fn test_average_always_divides_by_eight() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set(0, 1, 4.0).unwrap();
        grid.set(3, 3, 4.0).unwrap();
        let hood = Neighborhood::new(&grid);
        assert_eq!(hood.average(0, 0), 1.0);
    }

    #[test]
    fn test_count_in_range_excludes_bounds() {
        let grid = grid_from(&[
            &[0.0, 1.0, 5.0],
            &[4.0, 9.0, 2.0],
            &[5.0, 0.0, 6.0],
        ]);
        let hood = Neighborhood::new(&grid);
        // Neighbors of the center: 0 1 5 4 2 5 0 6; 0 < v < 5 keeps 1 4 2.
        assert_eq!(hood.count_in_range(1, 1, 0.0, 5.0), 3);
    }

    #[test]
    fn test_windowed_sum_includes_center_and_wraps() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.fill(1.0);
        let hood = Neighborhood::new(&grid);
        assert_eq!(hood.windowed_sum(0, 0, 1), 1.0);
        assert_eq!(hood.windowed_sum(0, 0, 3), 9.0);
        assert_eq!(hood.windowed_sum(4, 4, 5), 25.0);
        // Wider than the grid: each cell is counted more than once.
        assert_eq!(hood.windowed_sum(2, 2, 7), 49.0);
    }

    #[test]
    fn test_tiny_grid_neighbors_alias() {
        let mut grid = Grid::new(1, 1).unwrap();
        grid.set(0, 0, 1.0).unwrap();
        let hood = Neighborhood::new(&grid);
        assert_eq!(hood.count_alive(0, 0, AlivePredicate::StrictlyOne), 8);
    }
}
