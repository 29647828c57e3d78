use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

/// Strategy that arms the cells of a freshly created board.
pub trait MinePlacer {
    /// Places `mines` mines. `start` is the first revealed cell when placement was
    /// deferred until the first move, `None` when placing up front.
    fn place(self, board: &mut Board, mines: CellCount, start: Option<Coord2>) -> Result<()>;
}

/// How much the first revealed cell is protected.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartCell {
    /// Mines are placed when the game is created, the first click may hit one.
    #[default]
    Random,
    /// The first revealed cell is never a mine.
    SimpleSafe,
    /// The first revealed cell and its neighbours are never mines.
    AlwaysZero,
}

impl StartCell {
    /// Whether mine placement waits for the first reveal.
    pub const fn defers_placement(self) -> bool {
        !matches!(self, Self::Random)
    }
}

/// A prepared layout with mines at exact coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedLayout {
    mines: BTreeSet<Coord2>,
}

impl FixedLayout {
    pub fn new(mines: &[Coord2]) -> Self {
        Self {
            mines: mines.iter().copied().collect(),
        }
    }

    pub fn mine_count(&self) -> CellCount {
        self.mines.len().try_into().unwrap_or(CellCount::MAX)
    }
}

impl MinePlacer for FixedLayout {
    fn place(self, board: &mut Board, mines: CellCount, _start: Option<Coord2>) -> Result<()> {
        let actual = self.mine_count();
        if actual != mines {
            return Err(ConfigIssue::MineCountMismatch {
                expected: mines,
                actual,
            }
            .into());
        }

        let coords: Vec<Coord2> = self.mines.into_iter().collect();
        board.set_mines(&coords)
    }
}
