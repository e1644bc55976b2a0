use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::constraint::Constraint;
use crate::grid::{Cell, Dimensions};

/// Everything the player has proven about one board.
///
/// Knowledge only grows: cells move from unknown to confirmed mine or
/// confirmed safe, never back. Constraints hold whatever is known about the
/// remaining unknown cells and are rewritten into smaller statements as the
/// closure runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    dimensions: Dimensions,
    /// Cells the player has already revealed.
    moves_made: BTreeSet<Cell>,
    mines: BTreeSet<Cell>,
    safes: BTreeSet<Cell>,
    constraints: BTreeSet<Constraint>,
}

/// What a single observation taught the knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Closure passes run, including the final pass that saw no change.
    pub passes: usize,
    /// `pass_bound` measured when the closure started.
    pub pass_bound: u128,
    pub new_mines: BTreeSet<Cell>,
    pub new_safes: BTreeSet<Cell>,
}

impl KnowledgeBase {
    pub fn new(dimensions: Dimensions) -> Self {
        KnowledgeBase {
            dimensions,
            moves_made: BTreeSet::new(),
            mines: BTreeSet::new(),
            safes: BTreeSet::new(),
            constraints: BTreeSet::new(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.moves_made
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn safes(&self) -> &BTreeSet<Cell> {
        &self.safes
    }

    pub fn constraints(&self) -> &BTreeSet<Constraint> {
        &self.constraints
    }

    /// Upper bound on the passes `propagate` can take from the current state.
    ///
    /// A constraint over `n` cells is weighed by the ordered Bell number of
    /// `n`, which is larger than the weights of all proper non-empty subsets
    /// of those cells put together. A pass that changes anything drops a
    /// constraint, shrinks one, or swaps one for distinct proper subsets of
    /// it, so the total weight falls on every such pass. Clues span at most
    /// 8 cells, so each observation adds at most 545835 and the bound stays
    /// linear in the size of the board.
    pub fn pass_bound(&self) -> u128 {
        let longest = self.constraints.iter().map(Constraint::len).max().unwrap_or(0);
        let weights = ordered_bell_numbers(longest);
        self.constraints
            .iter()
            .map(|constraint| weights[constraint.len()])
            .fold(1, u128::saturating_add)
    }

    /// Records `cell` as a mine and removes it from every constraint.
    pub fn mark_mine(&mut self, cell: Cell) {
        self.settle(&BTreeSet::from([cell]), &BTreeSet::new());
    }

    /// Records `cell` as safe and removes it from every constraint.
    pub fn mark_safe(&mut self, cell: Cell) {
        self.settle(&BTreeSet::new(), &BTreeSet::from([cell]));
    }

    /// Confirms a batch of mines and safe cells, then reduces every
    /// constraint by all of them in one rebuild of the set.
    fn settle(&mut self, mines: &BTreeSet<Cell>, safes: &BTreeSet<Cell>) {
        for cell in mines {
            assert!(
                !self.safes.contains(cell) && !safes.contains(cell),
                "{cell} is already confirmed safe"
            );
        }
        for cell in safes {
            assert!(
                !self.mines.contains(cell),
                "{cell} is already confirmed as a mine"
            );
        }
        self.mines.extend(mines);
        self.safes.extend(safes);

        let touched = |constraint: &Constraint| {
            !constraint.cells().is_disjoint(mines) || !constraint.cells().is_disjoint(safes)
        };
        if !self.constraints.iter().any(touched) {
            return;
        }
        self.constraints = std::mem::take(&mut self.constraints)
            .into_iter()
            .map(|mut constraint| {
                reduce_known(&mut constraint, mines, safes);
                constraint
            })
            .filter(|constraint| !constraint.is_empty())
            .collect();
    }

    /// Adds a statement without deriving anything from it. Cells that are
    /// already confirmed are reduced away first.
    pub fn add_constraint(&mut self, mut constraint: Constraint) {
        reduce_known(&mut constraint, &self.mines, &self.safes);
        if !constraint.is_empty() {
            self.constraints.insert(constraint);
        }
    }

    /// Takes in a revealed clue: `cell` is safe and `count` of its neighbors
    /// are mines. Runs the closure to its fixed point before returning.
    pub fn observe(&mut self, cell: Cell, count: usize) -> Propagation {
        let mines_before = self.mines.clone();
        let safes_before = self.safes.clone();

        self.moves_made.insert(cell);
        self.mark_safe(cell);

        let mut remaining = count;
        let mut unknown = BTreeSet::new();
        for neighbor in self.dimensions.neighbors(cell) {
            if self.safes.contains(&neighbor) {
                continue;
            }
            if self.mines.contains(&neighbor) {
                remaining = remaining
                    .checked_sub(1)
                    .unwrap_or_else(|| panic!("{cell} reports {count} mines, fewer than known"));
                continue;
            }
            unknown.insert(neighbor);
        }

        let constraint = Constraint::new(unknown, remaining);
        if !constraint.is_empty() {
            self.constraints.insert(constraint);
        }

        let pass_bound = self.pass_bound();
        let passes = self.propagate();
        let propagation = Propagation {
            passes,
            pass_bound,
            new_mines: self.mines.difference(&mines_before).copied().collect(),
            new_safes: self.safes.difference(&safes_before).copied().collect(),
        };

        debug!(
            %cell,
            count,
            passes,
            new_mines = propagation.new_mines.len(),
            new_safes = propagation.new_safes.len(),
            constraints = self.constraints.len(),
            "observed clue"
        );
        propagation
    }

    /// Derives facts and smaller constraints until nothing changes.
    /// Returns the number of passes taken, at most `pass_bound()`.
    pub fn propagate(&mut self) -> usize {
        let mut passes = 0;

        loop {
            passes += 1;
            let snapshot = self.constraints.clone();

            let mut new_safes = BTreeSet::new();
            let mut new_mines = BTreeSet::new();
            let mut unresolved = BTreeSet::new();
            for constraint in &snapshot {
                let safe = constraint.known_safe();
                let mines = constraint.known_mines();
                if safe.is_empty() && mines.is_empty() {
                    unresolved.insert(constraint.clone());
                } else {
                    new_safes.extend(safe);
                    new_mines.extend(mines);
                }
            }
            self.constraints = unresolved;
            self.settle(&new_mines, &new_safes);

            self.constraints = subsume(&self.constraints);

            trace!(
                pass = passes,
                new_safes = new_safes.len(),
                new_mines = new_mines.len(),
                constraints = self.constraints.len(),
                "closure pass"
            );

            if self.constraints == snapshot {
                break;
            }
        }

        debug_assert!(self.is_consistent(), "knowledge base left inconsistent");
        passes
    }

    /// A confirmed-safe cell that has not been revealed yet, if any.
    pub fn choose_known_safe_move(&self) -> Option<Cell> {
        self.safes.difference(&self.moves_made).next().copied()
    }

    /// A uniformly random cell that is neither revealed nor a known mine.
    /// Returns `None` once every cell on the board is accounted for.
    pub fn choose_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        if self.mines.len() + self.safes.len() >= self.dimensions.area() {
            return None;
        }

        let candidates: Vec<Cell> = self
            .dimensions
            .cells()
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Checks the structural invariants: no cell is both mine and safe, every
    /// move is safe, and constraints mention only unknown cells.
    pub fn is_consistent(&self) -> bool {
        self.mines.is_disjoint(&self.safes)
            && self.moves_made.is_subset(&self.safes)
            && self.constraints.iter().all(|constraint| {
                !constraint.is_empty()
                    && constraint
                        .cells()
                        .iter()
                        .all(|cell| !self.mines.contains(cell) && !self.safes.contains(cell))
            })
    }
}

fn reduce_known(constraint: &mut Constraint, mines: &BTreeSet<Cell>, safes: &BTreeSet<Cell>) {
    let known_mines: Vec<Cell> = constraint.cells().intersection(mines).copied().collect();
    let known_safe: Vec<Cell> = constraint.cells().intersection(safes).copied().collect();
    for cell in known_mines {
        constraint.reduce_mine(cell);
    }
    for cell in known_safe {
        constraint.reduce_safe(cell);
    }
}

/// For every pair where `inner` is strictly contained in `outer`, derives
/// `outer − inner`. A constraint that contains others is replaced by all of
/// its derivatives; one that contains nothing is kept as it is.
fn subsume(snapshot: &BTreeSet<Constraint>) -> BTreeSet<Constraint> {
    snapshot
        .iter()
        .flat_map(|outer| {
            let derived: Vec<Constraint> = snapshot
                .iter()
                .filter(|inner| inner.is_strict_subset_of(outer))
                .map(|inner| outer.without(inner))
                .collect();
            if derived.is_empty() {
                vec![outer.clone()]
            } else {
                derived
            }
        })
        .collect()
}

/// Ordered Bell numbers `a(0)..=a(max)`, where `a(n)` is the sum over
/// `k < n` of `C(n, k) * a(k)`. Saturates instead of overflowing.
fn ordered_bell_numbers(max: usize) -> Vec<u128> {
    let mut binomials = vec![1u128];
    let mut bell = vec![1u128];
    for n in 1..=max {
        binomials = (0..=n)
            .map(|k| match k {
                0 => 1,
                k if k == n => 1,
                k => binomials[k - 1].saturating_add(binomials[k]),
            })
            .collect();
        let next = (0..n)
            .map(|k| binomials[k].saturating_mul(bell[k]))
            .fold(0, u128::saturating_add);
        bell.push(next);
    }
    bell
}
