use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A coordinate on the minesweeper board.
///
/// Cells order row-major, so sets of cells iterate top-left to bottom-right.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The size of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: usize,
    pub width: usize,
}

impl Dimensions {
    pub const fn new(height: usize, width: usize) -> Self {
        Dimensions { height, width }
    }

    /// Total number of cells on the board.
    pub const fn area(&self) -> usize {
        self.height * self.width
    }

    pub const fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Every cell on the board in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        (0..self.height)
            .cartesian_product(0..self.width)
            .map(Cell::from)
    }

    /// All in-bounds cells adjacent to `cell`, diagonals included.
    /// Corners yield 3 neighbors, edges 5 and interior cells 8.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + use<> {
        let height = self.height;
        let width = self.width;

        (-1..=1isize).flat_map(move |dr| {
            (-1..=1isize).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let row = cell.row.checked_add_signed(dr)?;
                let col = cell.col.checked_add_signed(dc)?;

                (row < height && col < width).then_some(Cell { row, col })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors() {
        let dimensions = Dimensions::new(3, 3);

        // Corner cell should have 3 neighbors
        assert_eq!(dimensions.neighbors(Cell::new(0, 0)).count(), 3);

        // Center cell should have 8 neighbors
        assert_eq!(dimensions.neighbors(Cell::new(1, 1)).count(), 8);

        // Edge cell should have 5 neighbors
        assert_eq!(dimensions.neighbors(Cell::new(0, 1)).count(), 5);
    }

    #[test]
    fn test_neighbors_exclude_the_cell_itself() {
        let dimensions = Dimensions::new(3, 3);
        let center = Cell::new(1, 1);
        assert!(dimensions.neighbors(center).all(|n| n != center));
    }

    #[test]
    fn test_neighbors_on_a_single_row() {
        let dimensions = Dimensions::new(1, 3);
        let neighbors: Vec<Cell> = dimensions.neighbors(Cell::new(0, 1)).collect();
        assert_eq!(neighbors, vec![Cell::new(0, 0), Cell::new(0, 2)]);
    }

    #[test]
    fn test_cells_are_row_major() {
        let dimensions = Dimensions::new(2, 3);
        let cells: Vec<Cell> = dimensions.cells().collect();
        assert_eq!(cells.len(), dimensions.area());
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[2], Cell::new(0, 2));
        assert_eq!(cells[3], Cell::new(1, 0));
        assert!(cells.iter().all(|&cell| dimensions.contains(cell)));
    }
}
