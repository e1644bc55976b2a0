//! A minesweeper player that reasons with a knowledge base of constraints.
//!
//! Each revealed clue becomes a [`Constraint`] ("exactly n of these cells are
//! mines"). The [`KnowledgeBase`] propagates every new clue to a fixed point,
//! confirming mines and safe cells and rewriting constraints into smaller
//! ones. A [`Session`] plays a [`Board`] with it, taking proven-safe cells
//! first and guessing only when nothing is proven.

pub mod board;
pub mod config;
pub mod constraint;
pub mod error;
pub mod grid;
pub mod knowledge;
pub mod oracle;
pub mod session;

pub use board::{Board, MineField};
pub use config::GameConfig;
pub use constraint::Constraint;
pub use error::{Error, Result};
pub use grid::{Cell, Dimensions};
pub use knowledge::{KnowledgeBase, Propagation};
pub use oracle::Deduction;
pub use session::{Audit, CellView, GameState, Outcome, Session, Strategy, Turn};
