use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::board::{Board, MineField};
use crate::constraint::Constraint;
use crate::error::{Error, Result};
use crate::grid::Cell;
use crate::knowledge::{KnowledgeBase, Propagation};
use crate::oracle::{self, Deduction};

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// How the player picked a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The knowledge base proved the cell safe.
    Inferred,
    /// Nothing was provably safe, so an unknown cell was picked at random.
    Guess,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Exploded,
    Revealed { count: usize, propagation: Propagation },
}

/// One move of the automated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub cell: Cell,
    pub strategy: Strategy,
    pub outcome: Outcome,
}

/// What the player sees of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    /// Proven safe but not revealed yet.
    Safe,
    /// Proven to be a mine.
    Flagged,
    Revealed(usize),
    Exploded,
}

/// Cells the revealed clues force that the knowledge base has not confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audit {
    pub missed_mines: BTreeSet<Cell>,
    pub missed_safes: BTreeSet<Cell>,
}

impl Audit {
    pub fn is_complete(&self) -> bool {
        self.missed_mines.is_empty() && self.missed_safes.is_empty()
    }
}

/// A single game: the hidden board, the player's knowledge and the outcome
/// so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    board: Board,
    knowledge: KnowledgeBase,
    state: GameState,
    exploded: Option<Cell>,
    turns: usize,
}

impl Session {
    pub fn new(board: Board) -> Self {
        let knowledge = KnowledgeBase::new(board.dimensions());
        let state = if board.won(knowledge.mines()) {
            GameState::Won
        } else {
            GameState::Playing
        };
        Session {
            board,
            knowledge,
            state,
            exploded: None,
            turns: 0,
        }
    }

    /// Decodes a session from bytes.
    pub fn from_bytes(bts: &[u8]) -> Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Encodes the session to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Makes one move: a known-safe cell if there is one, a random guess
    /// otherwise. Returns `Ok(None)` when no cell is left to pick.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Option<Turn>> {
        if self.state != GameState::Playing {
            return Err(Error::GameOver);
        }

        let (cell, strategy) = match self.knowledge.choose_known_safe_move() {
            Some(cell) => (cell, Strategy::Inferred),
            None => match self.knowledge.choose_random_move(rng) {
                Some(cell) => (cell, Strategy::Guess),
                None => return Ok(None),
            },
        };
        self.turns += 1;

        let outcome = if self.board.is_mine(cell) {
            self.state = GameState::Lost;
            self.exploded = Some(cell);
            Outcome::Exploded
        } else {
            let count = self.board.neighbor_mine_count(cell);
            let propagation = self.knowledge.observe(cell, count);
            if self.board.won(self.knowledge.mines()) {
                self.state = GameState::Won;
            }
            Outcome::Revealed { count, propagation }
        };

        debug!(turn = self.turns, %cell, ?strategy, state = ?self.state, "turn played");
        if self.state != GameState::Playing {
            info!(turns = self.turns, state = ?self.state, "game over");
        }

        Ok(Some(Turn {
            cell,
            strategy,
            outcome,
        }))
    }

    /// Steps until the game is decided or the player runs out of moves.
    pub fn play<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<GameState> {
        while self.state == GameState::Playing {
            if self.step(rng)?.is_none() {
                break;
            }
        }
        Ok(self.state)
    }

    pub fn view(&self, cell: Cell) -> CellView {
        if self.exploded == Some(cell) {
            CellView::Exploded
        } else if self.knowledge.moves_made().contains(&cell) {
            CellView::Revealed(self.board.neighbor_mine_count(cell))
        } else if self.knowledge.mines().contains(&cell) {
            CellView::Flagged
        } else if self.knowledge.safes().contains(&cell) {
            CellView::Safe
        } else {
            CellView::Hidden
        }
    }

    /// Every clue revealed so far as raw constraints: the revealed cell is
    /// safe, and its whole neighborhood holds the clue's count.
    pub fn clues(&self) -> Vec<Constraint> {
        let dimensions = self.board.dimensions();
        self.knowledge
            .moves_made()
            .iter()
            .flat_map(|&cell| {
                [
                    Constraint::new([cell], 0),
                    Constraint::new(
                        dimensions.neighbors(cell),
                        self.board.neighbor_mine_count(cell),
                    ),
                ]
            })
            .collect()
    }

    /// Checks the knowledge base against exact entailment of the clues.
    ///
    /// Fails if the player confirmed a cell the clues do not force.
    /// Otherwise reports the forced cells the player has not found yet.
    pub fn audit(&self) -> anyhow::Result<Audit> {
        let mines = self.knowledge.mines();
        let safes = self.knowledge.safes();
        let mut audit = Audit::default();

        for (cell, deduction) in oracle::deduce(&self.clues())? {
            match deduction {
                Deduction::ForcedMine => {
                    if safes.contains(&cell) {
                        anyhow::bail!("{cell} confirmed safe but the clues force a mine");
                    }
                    if !mines.contains(&cell) {
                        audit.missed_mines.insert(cell);
                    }
                }
                Deduction::ForcedSafe => {
                    if mines.contains(&cell) {
                        anyhow::bail!("{cell} confirmed as a mine but the clues force it safe");
                    }
                    if !safes.contains(&cell) {
                        audit.missed_safes.insert(cell);
                    }
                }
                Deduction::Undetermined => {
                    if mines.contains(&cell) || safes.contains(&cell) {
                        anyhow::bail!("{cell} confirmed without being forced by the clues");
                    }
                }
            }
        }

        Ok(audit)
    }
}
