use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::grid::{Cell, Dimensions};

/// The queries a player may make about the hidden layout.
pub trait MineField {
    fn dimensions(&self) -> Dimensions;

    fn is_mine(&self, cell: Cell) -> bool;

    /// Number of mines adjacent to `cell`, not counting the cell itself.
    fn neighbor_mine_count(&self, cell: Cell) -> usize {
        self.dimensions()
            .neighbors(cell)
            .filter(|&neighbor| self.is_mine(neighbor))
            .count()
    }
}

/// The hidden mine layout of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    dimensions: Dimensions,
    mines: BTreeSet<Cell>,
}

impl Board {
    /// Places `config.mines` mines uniformly at random.
    pub fn generate<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Self> {
        let dimensions = config.validate()?;
        let width = dimensions.width;

        let mines = index::sample(rng, dimensions.area(), config.mines)
            .into_iter()
            .map(|i| Cell::new(i / width, i % width))
            .collect();

        Ok(Board { dimensions, mines })
    }

    /// A board with a fixed layout.
    pub fn with_mines(
        dimensions: Dimensions,
        mines: impl IntoIterator<Item = Cell>,
    ) -> Result<Self> {
        let mines: BTreeSet<Cell> = mines.into_iter().collect();
        GameConfig {
            height: dimensions.height,
            width: dimensions.width,
            mines: mines.len(),
        }
        .validate()?;

        if let Some(&cell) = mines.iter().find(|&&cell| !dimensions.contains(cell)) {
            return Err(Error::OutOfBounds {
                cell,
                height: dimensions.height,
                width: dimensions.width,
            });
        }
        Ok(Board { dimensions, mines })
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    /// The game is won once the flagged cells are exactly the mines.
    pub fn won(&self, found: &BTreeSet<Cell>) -> bool {
        *found == self.mines
    }
}

impl MineField for Board {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = format!("{}-", "--".repeat(self.dimensions.width));
        for row in 0..self.dimensions.height {
            writeln!(f, "{separator}")?;
            for col in 0..self.dimensions.width {
                let mark = if self.is_mine(Cell::new(row, col)) { 'X' } else { ' ' };
                write!(f, "|{mark}")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{separator}")
    }
}
