//! Minesweeper engine for embedding behind any UI.
//!
//! A [`Game`] owns a [`Board`] of [`Cell`]s, places mines (optionally deferred until
//! the first reveal so that it is safe), cascades reveals through zero cells and
//! tracks whether the game is won or lost. Every move returns the set of cells that
//! changed so a presentation layer can redraw incrementally.

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use reveal::*;
pub use shared::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod game;
mod generator;
mod reveal;
mod shared;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
    #[serde(default)]
    pub start_cell: StartCell,
}

impl GameConfig {
    pub const fn new(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
            start_cell: StartCell::Random,
        }
    }

    pub fn with_start_cell(self, start_cell: StartCell) -> Self {
        Self { start_cell, ..self }
    }

    pub const fn beginner() -> Self {
        Self::new(9, 9, 10)
    }

    pub const fn intermediate() -> Self {
        Self::new(16, 16, 40)
    }

    pub const fn expert() -> Self {
        Self::new(30, 16, 99)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigIssue::EmptyBoard.into());
        }

        let available = self.total_cells();
        if self.mines >= available {
            return Err(ConfigIssue::TooManyMines {
                mines: self.mines,
                available,
            }
            .into());
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::beginner()
    }
}
