use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl GamePhase {
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Result of a move: the phase after it, and every cell whose unveiled or flag state
/// changed, so a UI only has to redraw those.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub phase: GamePhase,
    pub changed: BTreeSet<Coord2>,
}

impl MoveOutcome {
    pub fn has_update(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Shorthand for a game with mines placed at random when it is created.
pub fn new_game(width: Coord, height: Coord, mines: CellCount) -> Result<Game> {
    Game::new(GameConfig::new(width, height, mines))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    seed: u64,
    board: Board,
    phase: GamePhase,
    triggered_mine: Option<Coord2>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_seed(config, rand::random())
    }

    /// Same seed and config always lead to the same mines, given the same first reveal.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut board = Board::new(config.width, config.height)?;
        if !config.start_cell.defers_placement() {
            RandomPlacer::new(seed, config.start_cell).place(&mut board, config.mines, None)?;
        }
        log::debug!(
            "New {}x{} game with {} mines, start cell {:?}, seed {}",
            config.width,
            config.height,
            config.mines,
            config.start_cell,
            seed
        );
        Ok(Self::from_parts(config, seed, board))
    }

    /// Places mines up front with a custom strategy. The start cell policy of
    /// `config` does not apply.
    pub fn with_placer(config: GameConfig, placer: impl MinePlacer) -> Result<Self> {
        config.validate()?;
        let mut board = Board::new(config.width, config.height)?;
        placer.place(&mut board, config.mines, None)?;
        Ok(Self::from_parts(config, 0, board))
    }

    /// Game over a prepared layout, mainly for tests and puzzles.
    pub fn from_mine_coords(width: Coord, height: Coord, mines: &[Coord2]) -> Result<Self> {
        let layout = FixedLayout::new(mines);
        let config = GameConfig::new(width, height, layout.mine_count());
        Self::with_placer(config, layout)
    }

    fn from_parts(config: GameConfig, seed: u64, board: Board) -> Self {
        Self {
            config,
            seed,
            board,
            phase: GamePhase::InProgress,
            triggered_mine: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `(height, width)`
    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    /// Unmasked board, including hidden mines.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// Mines minus flags, negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.board.flag_count() as isize)
    }

    pub fn unveiled_count(&self) -> CellCount {
        self.board.unveiled_count()
    }

    /// The mine that ended the game, if it was lost.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn cell_view(&self, coords: Coord2) -> Result<CellView> {
        let cell = self.board.cell_at(coords)?;
        Ok(CellView::new(cell, self.is_finished()))
    }

    /// Opens a hidden, unflagged cell, cascading through zero cells.
    pub fn reveal(&mut self, coords: Coord2) -> Result<MoveOutcome> {
        let coords = self.board.validate_coords(coords)?;
        let cell = self.board[coords];
        if self.is_finished() || cell.is_unveiled() || cell.has_flag() {
            return Ok(self.outcome(BTreeSet::new()));
        }

        self.ensure_mines(coords)?;
        let changed = flood_reveal(&mut self.board, coords)?;
        self.settle(&changed);
        Ok(self.outcome(changed))
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MoveOutcome> {
        let coords = self.board.validate_coords(coords)?;
        let mut changed = BTreeSet::new();
        if self.phase.is_in_progress() && self.board.toggle_flag(coords) {
            changed.insert(coords);
        }
        Ok(self.outcome(changed))
    }

    /// Opens every unflagged neighbour of a number whose flags are all placed.
    ///
    /// Misplaced flags make this lose the game like any other mine reveal, and no
    /// further neighbours are opened after the first mine.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<MoveOutcome> {
        let coords = self.board.validate_coords(coords)?;
        let mut changed = BTreeSet::new();
        if self.is_finished() {
            return Ok(self.outcome(changed));
        }

        for target in chord_targets(&self.board, coords)? {
            changed.append(&mut flood_reveal(&mut self.board, target)?);
            if self.board[target].has_mine() {
                break;
            }
        }
        self.settle(&changed);
        Ok(self.outcome(changed))
    }

    fn ensure_mines(&mut self, first: Coord2) -> Result<()> {
        if self.board.mines_placed() {
            return Ok(());
        }

        RandomPlacer::new(self.seed, self.config.start_cell).place(
            &mut self.board,
            self.config.mines,
            Some(first),
        )
    }

    fn settle(&mut self, changed: &BTreeSet<Coord2>) {
        let hit = changed
            .iter()
            .copied()
            .find(|&pos| self.board[pos].has_mine());
        if let Some(mine) = hit {
            log::debug!("Mine unveiled at {:?}, game lost", mine);
            self.triggered_mine = Some(mine);
            self.phase = GamePhase::Lost;
        } else if self.board.unveiled_count() == self.board.safe_cell_count() {
            log::debug!("All {} safe cells unveiled, game won", self.board.safe_cell_count());
            self.phase = GamePhase::Won;
        }
    }

    fn outcome(&self, changed: BTreeSet<Coord2>) -> MoveOutcome {
        MoveOutcome {
            phase: self.phase,
            changed,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (height, width) = self.size();
        for row in 0..height {
            for col in 0..width {
                let view = CellView::new(&self.board[(row, col)], self.is_finished());
                write!(f, "{}", view.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
