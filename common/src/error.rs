use thiserror::Error;

use crate::grid::Cell;

#[derive(Debug, Error)]
pub enum Error {
    #[error("board dimensions must be non-zero, got {height}x{width}")]
    EmptyBoard { height: usize, width: usize },

    #[error("a {height}x{width} board cannot hold {mines} mines")]
    TooManyMines {
        height: usize,
        width: usize,
        mines: usize,
    },

    #[error("cell {cell} lies outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    #[error("the game is already over")]
    GameOver,

    #[error("session encoding failed: {0}")]
    Codec(#[from] bcs::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
