use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::grid::Cell;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// A revealed '1' with three hidden neighbors becomes a constraint over those
/// three cells with a count of one. Constraints only ever shrink, through
/// [`Constraint::reduce_mine`] and [`Constraint::reduce_safe`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Constraint {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Constraint {
    /// Panics if `count` exceeds the number of distinct cells.
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Self {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        assert!(
            count <= cells.len(),
            "{count} mines cannot fit in {} cells",
            cells.len()
        );
        Constraint { cells, count }
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// An empty constraint is fully resolved and says nothing.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell is a mine when the count covers the whole set.
    pub fn known_mines(&self) -> BTreeSet<Cell> {
        if self.count == self.cells.len() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when the count is zero.
    pub fn known_safe(&self) -> BTreeSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Removes a cell now known to be a mine, taking one off the count.
    pub fn reduce_mine(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            assert!(self.count > 0, "{cell} is a mine but {self} allows none");
            self.count -= 1;
        }
    }

    /// Removes a cell now known to be safe.
    pub fn reduce_safe(&mut self, cell: Cell) {
        if self.cells.remove(&cell) {
            assert!(
                self.count <= self.cells.len(),
                "{cell} is safe but {self} needs it to be a mine"
            );
        }
    }

    pub fn is_strict_subset_of(&self, other: &Constraint) -> bool {
        self.cells.len() < other.cells.len() && self.cells.is_subset(&other.cells)
    }

    /// The statement left over once `subset` is accounted for: the cells only
    /// `self` mentions hold exactly the mines `subset` does not.
    pub fn without(&self, subset: &Constraint) -> Constraint {
        debug_assert!(subset.cells.is_subset(&self.cells));
        let count = self
            .count
            .checked_sub(subset.count)
            .unwrap_or_else(|| panic!("{subset} holds more mines than {self}"));
        Constraint::new(self.cells.difference(&subset.cells).copied(), count)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}
