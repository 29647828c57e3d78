use thiserror::Error;

use crate::{CellCount, Coord2};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigIssue),
    #[error("Coordinates {coords:?} are outside a board of size {size:?}")]
    OutOfBounds { coords: Coord2, size: Coord2 },
}

/// Reason a board or game could not be set up.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    #[error("board width and height must be positive")]
    EmptyBoard,
    #[error("{mines} mines do not fit into {available} available cells")]
    TooManyMines {
        mines: CellCount,
        available: CellCount,
    },
    #[error("layout has {actual} mines but {expected} were requested")]
    MineCountMismatch {
        expected: CellCount,
        actual: CellCount,
    },
    #[error("stored board at {at:?} contradicts its own cells")]
    InconsistentBoard { at: Coord2 },
    #[error("mines were already placed on this board")]
    MinesAlreadyPlaced,
}

pub type Result<T> = core::result::Result<T, GameError>;
