use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::*;

/// Cloneable handle to one game for hosts that drive it from several threads.
///
/// Every call holds the game's single lock for its whole duration, so a reveal and
/// the phase change it causes are seen together by other callers.
#[derive(Clone, Debug)]
pub struct SharedGame {
    inner: Arc<Mutex<Game>>,
}

impl SharedGame {
    pub fn new(game: Game) -> Self {
        Self {
            inner: Arc::new(Mutex::new(game)),
        }
    }

    // moves never leave a game half-updated, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, Game> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reveal(&self, coords: Coord2) -> Result<MoveOutcome> {
        self.lock().reveal(coords)
    }

    pub fn toggle_flag(&self, coords: Coord2) -> Result<MoveOutcome> {
        self.lock().toggle_flag(coords)
    }

    pub fn chord_reveal(&self, coords: Coord2) -> Result<MoveOutcome> {
        self.lock().chord_reveal(coords)
    }

    pub fn phase(&self) -> GamePhase {
        self.lock().phase()
    }

    pub fn cell_view(&self, coords: Coord2) -> Result<CellView> {
        self.lock().cell_view(coords)
    }

    /// Runs `f` against a consistent view of the game.
    pub fn read<R>(&self, f: impl FnOnce(&Game) -> R) -> R {
        f(&*self.lock())
    }

    /// Copy of the current game state.
    pub fn snapshot(&self) -> Game {
        self.read(Game::clone)
    }
}

impl From<Game> for SharedGame {
    fn from(game: Game) -> Self {
        Self::new(game)
    }
}
